use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    FullName,
    Phone,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Fields {
    Table,
    Id,
    Name,
    Description,
    PricePerHour,
    ImageUrl,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    FieldId,
    CustomerId,
    BookingDate,
    StartTime,
    EndTime,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    Status,
    TotalAmount,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    Title,
    Content,
    Excerpt,
    ImageUrl,
    IsPublished,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    SiteName,
    SiteLogoUrl,
    HeroBannerUrl,
    WhatsappNumber,
    QrisImageUrl,
    PaymentInstructions,
    WebhookUrl,
    UpdatedAt,
}

fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .uuid()
        .not_null()
        .primary_key()
        .default(Expr::cust("gen_random_uuid()"))
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .default(Expr::cust("NOW()"))
        .null()
        .to_owned()
}

fn bookings_table() -> TableCreateStatement {
    Table::create()
        .table(Bookings::Table)
        .if_not_exists()
        .col(&mut uuid_pk(Bookings::Id))
        .col(ColumnDef::new(Bookings::FieldId).uuid().not_null())
        .col(ColumnDef::new(Bookings::CustomerId).uuid().null())
        .col(ColumnDef::new(Bookings::BookingDate).date().not_null())
        .col(ColumnDef::new(Bookings::StartTime).time().not_null())
        .col(ColumnDef::new(Bookings::EndTime).time().not_null())
        .col(
            ColumnDef::new(Bookings::CustomerName)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(Bookings::CustomerPhone)
                .string_len(32)
                .not_null(),
        )
        .col(
            ColumnDef::new(Bookings::CustomerEmail)
                .string_len(255)
                .null(),
        )
        .col(
            ColumnDef::new(Bookings::Status)
                .custom(Alias::new("booking_status"))
                .not_null()
                .default(Expr::cust("'pending'::booking_status")),
        )
        .col(
            ColumnDef::new(Bookings::TotalAmount)
                .big_integer()
                .not_null(),
        )
        .col(ColumnDef::new(Bookings::Notes).text().null())
        .col(&mut timestamp(Bookings::CreatedAt))
        .col(&mut timestamp(Bookings::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_bookings_field")
                .from(Bookings::Table, Bookings::FieldId)
                .to(Fields::Table, Fields::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_bookings_customer")
                .from(Bookings::Table, Bookings::CustomerId)
                .to(Profiles::Table, Profiles::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_owned()
}

fn articles_table() -> TableCreateStatement {
    Table::create()
        .table(Articles::Table)
        .if_not_exists()
        .col(&mut uuid_pk(Articles::Id))
        .col(ColumnDef::new(Articles::Title).string_len(255).not_null())
        .col(ColumnDef::new(Articles::Content).text().not_null())
        .col(ColumnDef::new(Articles::Excerpt).text().null())
        .col(ColumnDef::new(Articles::ImageUrl).text().null())
        .col(
            ColumnDef::new(Articles::IsPublished)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Articles::AuthorId).uuid().null())
        .col(&mut timestamp(Articles::CreatedAt))
        .col(&mut timestamp(Articles::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_articles_author")
                .from(Articles::Table, Articles::AuthorId)
                .to(Profiles::Table, Profiles::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("user_role"))
                    .values(vec![
                        Alias::new("user"),
                        Alias::new("kasir"),
                        Alias::new("admin"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("booking_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("paid"),
                        Alias::new("canceled"),
                    ])
                    .to_owned(),
            )
            .await?;

        // profiles.id is the identity provider's user id, never generated here
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::FullName).string_len(255).null())
                    .col(ColumnDef::new(Profiles::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .custom(Alias::new("user_role"))
                            .not_null()
                            .default(Expr::cust("'user'::user_role")),
                    )
                    .col(&mut timestamp(Profiles::CreatedAt))
                    .col(&mut timestamp(Profiles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fields::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Fields::Id))
                    .col(ColumnDef::new(Fields::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Fields::Description).text().null())
                    .col(
                        ColumnDef::new(Fields::PricePerHour)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Fields::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(Fields::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut timestamp(Fields::CreatedAt))
                    .col(&mut timestamp(Fields::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // No unique constraint on (field_id, booking_date, start_time):
        // overlapping submissions are accepted.
        manager
            .create_table(
                bookings_table(),
            )
            .await?;

        manager
            .create_table(
                articles_table(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Settings::Id))
                    .col(ColumnDef::new(Settings::SiteName).string_len(255).not_null())
                    .col(ColumnDef::new(Settings::SiteLogoUrl).text().null())
                    .col(ColumnDef::new(Settings::HeroBannerUrl).text().null())
                    .col(ColumnDef::new(Settings::WhatsappNumber).string_len(32).null())
                    .col(ColumnDef::new(Settings::QrisImageUrl).text().null())
                    .col(ColumnDef::new(Settings::PaymentInstructions).text().null())
                    .col(ColumnDef::new(Settings::WebhookUrl).text().null())
                    .col(&mut timestamp(Settings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // settings is a singleton row
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "INSERT INTO settings (site_name) SELECT 'Padel Court' WHERE NOT EXISTS (SELECT 1 FROM settings);"
                .to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Articles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Fields::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("booking_status")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("user_role")).to_owned())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_are_created_inline() {
        let bookings = bookings_table().to_string(PostgresQueryBuilder);
        assert!(bookings.contains(r#""fk_bookings_field" FOREIGN KEY ("field_id")"#));
        assert!(bookings.contains(r#"REFERENCES "fields" ("id") ON DELETE RESTRICT"#));
        assert!(bookings.contains(r#""fk_bookings_customer" FOREIGN KEY ("customer_id")"#));
        assert!(!bookings.contains("UNIQUE"));

        let articles = articles_table().to_string(PostgresQueryBuilder);
        assert!(articles.contains(r#"FOREIGN KEY ("author_id") REFERENCES "profiles" ("id") ON DELETE SET NULL"#));
    }
}
