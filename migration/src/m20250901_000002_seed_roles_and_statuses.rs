use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Roles {
    Table,
    Name,
    Capabilities,
}

#[derive(DeriveIden)]
enum OrderStatuses {
    Table,
    Name,
    SortOrder,
    VisibleToOperator,
    VisibleToCourier,
    VisibleToWaiter,
    VisibleToChef,
    VisibleToBartender,
    NotifyCustomer,
    RequiresKitchenNotify,
    IsCompletedStatus,
    IsCancelledStatus,
    CustomerMessage,
}

const ROLES: &[(&str, &str)] = &[
    ("admin", "admin,operator,cashier"),
    ("operator", "operator"),
    ("cashier", "cashier,operator"),
    ("courier", "courier"),
    ("waiter", "waiter"),
    ("chef", "cook"),
    ("bartender", "bartender"),
];

struct SeedStatus {
    name: &'static str,
    // operator, courier, waiter, chef, bartender
    visible: [bool; 5],
    notify_customer: bool,
    kitchen: bool,
    completed: bool,
    cancelled: bool,
    message: Option<&'static str>,
}

const STATUSES: &[SeedStatus] = &[
    SeedStatus {
        name: "New",
        visible: [true, false, false, false, false],
        notify_customer: false,
        kitchen: false,
        completed: false,
        cancelled: false,
        message: None,
    },
    SeedStatus {
        name: "Accepted",
        visible: [true, false, true, true, true],
        notify_customer: true,
        kitchen: true,
        completed: false,
        cancelled: false,
        message: Some("Your order has been accepted and is being prepared."),
    },
    SeedStatus {
        name: "Ready",
        visible: [true, true, true, false, false],
        notify_customer: false,
        kitchen: false,
        completed: false,
        cancelled: false,
        message: None,
    },
    SeedStatus {
        name: "On the way",
        visible: [true, true, false, false, false],
        notify_customer: true,
        kitchen: false,
        completed: false,
        cancelled: false,
        message: Some("Your order is on the way."),
    },
    SeedStatus {
        name: "Completed",
        visible: [true, false, false, false, false],
        notify_customer: true,
        kitchen: false,
        completed: true,
        cancelled: false,
        message: Some("Thank you! Your order is completed."),
    },
    SeedStatus {
        name: "Cancelled",
        visible: [true, false, false, false, false],
        notify_customer: true,
        kitchen: false,
        completed: false,
        cancelled: true,
        message: Some("Your order has been cancelled."),
    },
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut roles = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Name, Roles::Capabilities])
            .to_owned();
        for (name, capabilities) in ROLES {
            roles.values_panic([(*name).into(), (*capabilities).into()]);
        }
        manager.exec_stmt(roles).await?;

        // New must be inserted first: new orders start in the lowest status id.
        let mut statuses = Query::insert()
            .into_table(OrderStatuses::Table)
            .columns([
                OrderStatuses::Name,
                OrderStatuses::SortOrder,
                OrderStatuses::VisibleToOperator,
                OrderStatuses::VisibleToCourier,
                OrderStatuses::VisibleToWaiter,
                OrderStatuses::VisibleToChef,
                OrderStatuses::VisibleToBartender,
                OrderStatuses::NotifyCustomer,
                OrderStatuses::RequiresKitchenNotify,
                OrderStatuses::IsCompletedStatus,
                OrderStatuses::IsCancelledStatus,
                OrderStatuses::CustomerMessage,
            ])
            .to_owned();
        for (idx, s) in STATUSES.iter().enumerate() {
            statuses.values_panic([
                s.name.into(),
                (idx as i32 * 10).into(),
                s.visible[0].into(),
                s.visible[1].into(),
                s.visible[2].into(),
                s.visible[3].into(),
                s.visible[4].into(),
                s.notify_customer.into(),
                s.kitchen.into(),
                s.completed.into(),
                s.cancelled.into(),
                s.message.map(|m| m.to_string()).into(),
            ]);
        }
        manager.exec_stmt(statuses).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = STATUSES.iter().map(|s| s.name).collect();
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(OrderStatuses::Table)
                    .and_where(Expr::col(OrderStatuses::Name).is_in(names))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Roles::Table)
                    .and_where(Expr::col(Roles::Name).is_in(ROLES.iter().map(|(n, _)| *n)))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
