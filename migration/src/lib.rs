pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_storage_hierarchy;
mod m20260301_000002_create_samples_and_positions;
mod m20260301_000003_create_relocation_workflows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_storage_hierarchy::Migration),
            Box::new(m20260301_000002_create_samples_and_positions::Migration),
            Box::new(m20260301_000003_create_relocation_workflows::Migration),
        ]
    }
}
