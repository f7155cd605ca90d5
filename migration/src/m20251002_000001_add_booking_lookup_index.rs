use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Bookings {
    Table,
    FieldId,
    BookingDate,
    CustomerId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Availability reads filter on (field_id, booking_date); the customer
/// dashboard filters on customer_id. Neither index is unique: two pending
/// bookings on the same slot are still accepted.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_field_date")
                    .table(Bookings::Table)
                    .col(Bookings::FieldId)
                    .col(Bookings::BookingDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_customer")
                    .table(Bookings::Table)
                    .col(Bookings::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_bookings_customer")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_bookings_field_date")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
