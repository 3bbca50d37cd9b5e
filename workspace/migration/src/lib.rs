pub use sea_orm_migration::prelude::*;

mod m20260115_000001_create_accounting_tables;
mod m20260210_000001_add_automation_runs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260115_000001_create_accounting_tables::Migration),
            Box::new(m20260210_000001_add_automation_runs::Migration),
        ]
    }
}
