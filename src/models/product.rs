use crate::entities::{PreparationArea, product_entity};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Margherita")]
    pub name: String,
    #[schema(example = 890)]
    pub price: i64,
    pub preparation_area: PreparationArea,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub preparation_area: Option<PreparationArea>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub preparation_area: PreparationArea,
    pub is_available: bool,
}

impl From<product_entity::Model> for ProductResponse {
    fn from(m: product_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            preparation_area: m.preparation_area,
            is_available: m.is_available,
        }
    }
}
