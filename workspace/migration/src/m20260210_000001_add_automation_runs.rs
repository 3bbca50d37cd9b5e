use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Audit trail for automation runs, added once automation moved
        // from an external cron wrapper into the service itself.
        manager
            .create_table(
                Table::create()
                    .table(AutomationRuns::Table)
                    .if_not_exists()
                    .col(pk_auto(AutomationRuns::Id))
                    .col(timestamp_with_time_zone(AutomationRuns::StartedAt))
                    .col(timestamp_with_time_zone_null(AutomationRuns::FinishedAt))
                    .col(text(AutomationRuns::TaskResults))
                    .col(string(AutomationRuns::TriggeredBy))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AutomationRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AutomationRuns {
    Table,
    Id,
    StartedAt,
    FinishedAt,
    TaskResults,
    TriggeredBy,
}
