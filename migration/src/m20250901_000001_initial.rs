use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    Capabilities,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FullName,
    Username,
    PasswordHash,
    RoleId,
    ChatId,
    IsOnShift,
    CashBalance,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderStatuses {
    Table,
    Id,
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
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    PreparationArea,
    IsAvailable,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shifts {
    Table,
    Id,
    EmployeeId,
    StartedAt,
    EndedAt,
    StartCash,
    EndCashActual,
    TotalCashSales,
    CashTurnedIn,
    TotalCardSales,
    ServiceIn,
    ServiceOut,
    HandoverTotal,
    TheoreticalCash,
    Closed,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerName,
    CustomerPhone,
    CustomerChatId,
    DeliveryMethod,
    Address,
    TableLabel,
    PaymentMethod,
    IsCashTurnedIn,
    ShiftId,
    CourierId,
    WaiterId,
    StatusId,
    Total,
    KitchenDone,
    BarDone,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductName,
    Quantity,
    Price,
    PreparationArea,
}

#[derive(DeriveIden)]
enum OrderStatusHistory {
    Table,
    Id,
    OrderId,
    StatusId,
    Actor,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CashTransactions {
    Table,
    Id,
    ShiftId,
    Amount,
    Kind,
    Comment,
    EmployeeId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeNotifications {
    Table,
    Id,
    EmployeeId,
    OrderId,
    Message,
    IsRead,
    CreatedAt,
}

fn id_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn flag_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .boolean()
        .not_null()
        .default(false)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(&mut id_col(Roles::Id))
                    .col(
                        ColumnDef::new(Roles::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::Capabilities)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(&mut id_col(Employees::Id))
                    .col(ColumnDef::new(Employees::FullName).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Employees::Username)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Employees::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::RoleId).big_integer().not_null())
                    .col(ColumnDef::new(Employees::ChatId).big_integer().null())
                    .col(&mut flag_col(Employees::IsOnShift))
                    .col(
                        ColumnDef::new(Employees::CashBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut created_at_col(Employees::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_role")
                            .from(Employees::Table, Employees::RoleId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderStatuses::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrderStatuses::Id))
                    .col(ColumnDef::new(OrderStatuses::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(OrderStatuses::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(&mut flag_col(OrderStatuses::VisibleToOperator))
                    .col(&mut flag_col(OrderStatuses::VisibleToCourier))
                    .col(&mut flag_col(OrderStatuses::VisibleToWaiter))
                    .col(&mut flag_col(OrderStatuses::VisibleToChef))
                    .col(&mut flag_col(OrderStatuses::VisibleToBartender))
                    .col(&mut flag_col(OrderStatuses::NotifyCustomer))
                    .col(&mut flag_col(OrderStatuses::RequiresKitchenNotify))
                    .col(&mut flag_col(OrderStatuses::IsCompletedStatus))
                    .col(&mut flag_col(OrderStatuses::IsCancelledStatus))
                    .col(ColumnDef::new(OrderStatuses::CustomerMessage).text().null())
                    .col(&mut created_at_col(OrderStatuses::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(&mut id_col(Products::Id))
                    .col(ColumnDef::new(Products::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Products::PreparationArea)
                            .string_len(16)
                            .not_null()
                            .default("kitchen"),
                    )
                    .col(
                        ColumnDef::new(Products::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut created_at_col(Products::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Shifts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Shifts::Id))
                    .col(ColumnDef::new(Shifts::EmployeeId).big_integer().not_null())
                    .col(&mut created_at_col(Shifts::StartedAt))
                    .col(
                        ColumnDef::new(Shifts::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Shifts::StartCash).big_integer().not_null())
                    .col(ColumnDef::new(Shifts::EndCashActual).big_integer().null())
                    .col(
                        ColumnDef::new(Shifts::TotalCashSales)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shifts::CashTurnedIn)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shifts::TotalCardSales)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shifts::ServiceIn)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shifts::ServiceOut)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shifts::HandoverTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Shifts::TheoreticalCash).big_integer().null())
                    .col(&mut flag_col(Shifts::Closed))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shifts_employee")
                            .from(Shifts::Table, Shifts::EmployeeId)
                            .to(Employees::Table, Employees::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(&mut id_col(Orders::Id))
                    .col(ColumnDef::new(Orders::CustomerName).string_len(128).not_null())
                    .col(ColumnDef::new(Orders::CustomerPhone).string_len(32).null())
                    .col(ColumnDef::new(Orders::CustomerChatId).big_integer().null())
                    .col(
                        ColumnDef::new(Orders::DeliveryMethod)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::Address).text().null())
                    .col(ColumnDef::new(Orders::TableLabel).string_len(32).null())
                    .col(ColumnDef::new(Orders::PaymentMethod).string_len(16).not_null())
                    .col(&mut flag_col(Orders::IsCashTurnedIn))
                    .col(ColumnDef::new(Orders::ShiftId).big_integer().null())
                    .col(ColumnDef::new(Orders::CourierId).big_integer().null())
                    .col(ColumnDef::new(Orders::WaiterId).big_integer().null())
                    .col(ColumnDef::new(Orders::StatusId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Total)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::KitchenDone)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Orders::BarDone)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Orders::Comment).text().null())
                    .col(&mut created_at_col(Orders::CreatedAt))
                    .col(&mut created_at_col(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_status")
                            .from(Orders::Table, Orders::StatusId)
                            .to(OrderStatuses::Table, OrderStatuses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_shift")
                            .from(Orders::Table, Orders::ShiftId)
                            .to(Shifts::Table, Shifts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrderItems::Id))
                    .col(ColumnDef::new(OrderItems::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).big_integer().null())
                    .col(
                        ColumnDef::new(OrderItems::ProductName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderItems::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(OrderItems::PreparationArea)
                            .string_len(16)
                            .not_null()
                            .default("kitchen"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderStatusHistory::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrderStatusHistory::Id))
                    .col(
                        ColumnDef::new(OrderStatusHistory::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::StatusId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::Actor)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(&mut created_at_col(OrderStatusHistory::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashTransactions::Table)
                    .if_not_exists()
                    .col(&mut id_col(CashTransactions::Id))
                    .col(
                        ColumnDef::new(CashTransactions::ShiftId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashTransactions::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(CashTransactions::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(CashTransactions::EmployeeId).big_integer().null())
                    .col(&mut created_at_col(CashTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_transactions_shift")
                            .from(CashTransactions::Table, CashTransactions::ShiftId)
                            .to(Shifts::Table, Shifts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeNotifications::Table)
                    .if_not_exists()
                    .col(&mut id_col(EmployeeNotifications::Id))
                    .col(
                        ColumnDef::new(EmployeeNotifications::EmployeeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeNotifications::OrderId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeNotifications::Message)
                            .text()
                            .not_null(),
                    )
                    .col(&mut flag_col(EmployeeNotifications::IsRead))
                    .col(&mut created_at_col(EmployeeNotifications::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // indexes
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shifts_closed")
                    .table(Shifts::Table)
                    .col(Shifts::Closed)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_shift_payment")
                    .table(Orders::Table)
                    .col(Orders::ShiftId)
                    .col(Orders::PaymentMethod)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::StatusId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_items_order")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_status_history_order")
                    .table(OrderStatusHistory::Table)
                    .col(OrderStatusHistory::OrderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cash_transactions_shift")
                    .table(CashTransactions::Table)
                    .col(CashTransactions::ShiftId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_employee_read")
                    .table(EmployeeNotifications::Table)
                    .col(EmployeeNotifications::EmployeeId)
                    .col(EmployeeNotifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(EmployeeNotifications::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(CashTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(OrderStatusHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Shifts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(OrderStatuses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Roles::Table).to_owned())
            .await?;
        Ok(())
    }
}
