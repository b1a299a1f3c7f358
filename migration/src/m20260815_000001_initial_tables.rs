use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Click::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Click::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Click::ProductId).string().not_null())
                    .col(ColumnDef::new(Click::Platform).string().not_null())
                    .col(ColumnDef::new(Click::UserId).string().null())
                    .col(ColumnDef::new(Click::ClientIp).string().null())
                    .col(ColumnDef::new(Click::UserAgent).text().null())
                    .col(ColumnDef::new(Click::Metadata).text().null())
                    .col(ColumnDef::new(Click::Status).string().not_null())
                    .col(ColumnDef::new(Click::OrderId).string().null())
                    .col(
                        ColumnDef::new(Click::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Click::ConvertedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_platform_created")
                    .table(Click::Table)
                    .col(Click::Platform)
                    .col(Click::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AffiliateLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffiliateLink::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AffiliateLink::ProductId).string().not_null())
                    .col(ColumnDef::new(AffiliateLink::Platform).string().not_null())
                    .col(ColumnDef::new(AffiliateLink::UserId).string().null())
                    .col(ColumnDef::new(AffiliateLink::ClickId).string().null())
                    .col(
                        ColumnDef::new(AffiliateLink::DestinationUrl)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AffiliateLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_affiliate_links_click_id")
                    .table(AffiliateLink::Table)
                    .col(AffiliateLink::ClickId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transaction::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transaction::UserId).string().null())
                    .col(ColumnDef::new(Transaction::Platform).string().not_null())
                    .col(ColumnDef::new(Transaction::ProductId).string().null())
                    .col(
                        ColumnDef::new(Transaction::Amount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transaction::OrderId).string().not_null())
                    .col(ColumnDef::new(Transaction::ClickId).string().null())
                    .col(ColumnDef::new(Transaction::Status).string().not_null())
                    .col(
                        ColumnDef::new(Transaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Webhook dedup key: at most one transaction per (platform, order_id).
        // Concurrent duplicate deliveries must fail here, not double-credit.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_transactions_platform_order")
                    .table(Transaction::Table)
                    .col(Transaction::Platform)
                    .col(Transaction::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_user_id")
                    .table(Transaction::Table)
                    .col(Transaction::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Withdrawal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Withdrawal::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Withdrawal::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Withdrawal::Amount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Withdrawal::Method).string().not_null())
                    .col(ColumnDef::new(Withdrawal::Details).text().not_null())
                    .col(ColumnDef::new(Withdrawal::Status).string().not_null())
                    .col(
                        ColumnDef::new(Withdrawal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Withdrawal::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Withdrawal::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_withdrawals_user_id")
                    .table(Withdrawal::Table)
                    .col(Withdrawal::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Withdrawal::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transaction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AffiliateLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Click::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Click {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    ProductId,
    Platform,
    UserId,
    ClientIp,
    UserAgent,
    Metadata,
    Status,
    OrderId,
    CreatedAt,
    ConvertedAt,
}

#[derive(DeriveIden)]
enum AffiliateLink {
    #[sea_orm(iden = "affiliate_links")]
    Table,
    Id,
    ProductId,
    Platform,
    UserId,
    ClickId,
    DestinationUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Transaction {
    #[sea_orm(iden = "transactions")]
    Table,
    Id,
    UserId,
    Platform,
    ProductId,
    Amount,
    OrderId,
    ClickId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Withdrawal {
    #[sea_orm(iden = "withdrawals")]
    Table,
    Id,
    UserId,
    Amount,
    Method,
    Details,
    Status,
    CreatedAt,
    ApprovedAt,
    CompletedAt,
}
