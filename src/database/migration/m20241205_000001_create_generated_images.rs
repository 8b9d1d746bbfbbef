use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 表结构由外部维护，这里只在缺失时补建（开发 / 测试环境），已有的表不做任何改动
        if manager.has_table("generated_images").await? {
            return Ok(());
        }

        manager.create_table(
            Table::create()
                .table(GeneratedImages::Table)
                .col(ColumnDef::new(GeneratedImages::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(GeneratedImages::GenerationTimestamp).date_time().not_null())
                .col(ColumnDef::new(GeneratedImages::GenerationWidth).integer().not_null())
                .col(ColumnDef::new(GeneratedImages::GenerationHeight).integer().not_null())
                .col(ColumnDef::new(GeneratedImages::GenerationSteps).integer().not_null())
                .col(ColumnDef::new(GeneratedImages::GenerationPrompt).text().null())
                .col(ColumnDef::new(GeneratedImages::ImgbbUrl).string().not_null())
                .col(ColumnDef::new(GeneratedImages::ImgbbDisplayUrl).string().not_null())
                .col(ColumnDef::new(GeneratedImages::ImgbbTitle).string().null())
                .col(ColumnDef::new(GeneratedImages::ImgbbWidth).integer().not_null())
                .col(ColumnDef::new(GeneratedImages::ImgbbHeight).integer().not_null())
                .col(ColumnDef::new(GeneratedImages::ImgbbSize).big_integer().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_generated_images_timestamp")
                .table(GeneratedImages::Table)
                .col(GeneratedImages::GenerationTimestamp)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(GeneratedImages::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
enum GeneratedImages {
    Table,
    Id,
    GenerationTimestamp,
    GenerationWidth,
    GenerationHeight,
    GenerationSteps,
    GenerationPrompt,
    ImgbbUrl,
    ImgbbDisplayUrl,
    ImgbbTitle,
    ImgbbWidth,
    ImgbbHeight,
    ImgbbSize,
}
