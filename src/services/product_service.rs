use crate::entities::product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct ProductService {
    pool: DatabaseConnection,
}

impl ProductService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Customer menu: available products only.
    pub async fn menu(&self) -> AppResult<Vec<ProductResponse>> {
        let list = products::Entity::find()
            .filter(products::Column::IsAvailable.eq(true))
            .order_by_asc(products::Column::PreparationArea)
            .order_by_asc(products::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn list(&self) -> AppResult<Vec<ProductResponse>> {
        let list = products::Entity::find()
            .order_by_asc(products::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, req: CreateProductRequest) -> AppResult<ProductResponse> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Product name is required".into()));
        }
        if req.price < 0 {
            return Err(AppError::ValidationError("Price cannot be negative".into()));
        }

        let product = products::ActiveModel {
            name: Set(name.to_string()),
            price: Set(req.price),
            preparation_area: Set(req.preparation_area),
            is_available: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(product.into())
    }

    /// Price changes only affect future orders; existing lines keep their snapshot.
    pub async fn update(&self, id: i64, req: UpdateProductRequest) -> AppResult<ProductResponse> {
        let product = products::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product #{id} not found")))?;

        let mut am = product.into_active_model();
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Product name is required".into()));
            }
            am.name = Set(name);
        }
        if let Some(price) = req.price {
            if price < 0 {
                return Err(AppError::ValidationError("Price cannot be negative".into()));
            }
            am.price = Set(price);
        }
        if let Some(area) = req.preparation_area {
            am.preparation_area = Set(area);
        }
        if let Some(available) = req.is_available {
            am.is_available = Set(available);
        }

        Ok(am.update(&self.pool).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PreparationArea;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_menu_hides_unavailable_products() {
        let db = setup_test_db().await.unwrap();
        let service = ProductService::new(db);

        let soup = service
            .create(CreateProductRequest {
                name: "Borscht".into(),
                price: 450,
                preparation_area: PreparationArea::Kitchen,
            })
            .await
            .unwrap();
        service
            .create(CreateProductRequest {
                name: "Kvass".into(),
                price: 200,
                preparation_area: PreparationArea::Bar,
            })
            .await
            .unwrap();

        service
            .update(
                soup.id,
                UpdateProductRequest {
                    name: None,
                    price: None,
                    preparation_area: None,
                    is_available: Some(false),
                },
            )
            .await
            .unwrap();

        let menu = service.menu().await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].name, "Kvass");
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
