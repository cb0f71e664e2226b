use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

/// Prizes (奖品配置表)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    Label,
    Weight,
    CreatedAt,
    UpdatedAt,
}

/// Booking Reservations (预订号占用表, 一个预订号只能抽一次)
#[derive(DeriveIden)]
enum BookingReservations {
    Table,
    BookingId,
    ReservedAt,
}

/// Draw Records (抽奖记录)
#[derive(DeriveIden)]
enum DrawRecords {
    Table,
    Id,
    BookingId,
    PrizeId,
    PrizeLabel,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 权重为相对值, 抽奖时按总和归一化; 权重全部为空或为 0 时退化为均匀抽取。
/// 初始奖品配置:
/// - Free Night Stay 2
/// - Room Upgrade 8
/// - Welcome Drink 30
/// - Late Checkout 25
/// - Thank You 35
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 奖品表
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::Label).string_len(255).not_null())
                    .col(ColumnDef::new(Prizes::Weight).double().null()) // NULL = 未设置权重
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 预订号占用表: 主键即唯一约束, 作为原子的 reserve-if-absent
        manager
            .create_table(
                Table::create()
                    .table(BookingReservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingReservations::BookingId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BookingReservations::ReservedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 抽奖记录表
        manager
            .create_table(
                Table::create()
                    .table(DrawRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawRecords::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::BookingId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrawRecords::PrizeId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(DrawRecords::PrizeLabel)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个预订号最多一条记录 (同时作为写入幂等键)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_booking_unique")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::BookingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 后台按时间倒序查看记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_created_at")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 不加奖品外键: 奖品删除后历史记录仍保留 prize_label 快照

        let conn = manager.get_connection();
        let insert_sql = r#"
INSERT INTO prizes (id, label, weight, created_at)
VALUES
 ('6f1c2a8e-0d4b-4b7e-9a51-3c0f2d7b9e01', 'Free Night Stay', 2,  NOW()),
 ('6f1c2a8e-0d4b-4b7e-9a51-3c0f2d7b9e02', 'Room Upgrade',    8,  NOW() + INTERVAL '1 millisecond'),
 ('6f1c2a8e-0d4b-4b7e-9a51-3c0f2d7b9e03', 'Welcome Drink',   30, NOW() + INTERVAL '2 millisecond'),
 ('6f1c2a8e-0d4b-4b7e-9a51-3c0f2d7b9e04', 'Late Checkout',   25, NOW() + INTERVAL '3 millisecond'),
 ('6f1c2a8e-0d4b-4b7e-9a51-3c0f2d7b9e05', 'Thank You',       35, NOW() + INTERVAL '4 millisecond')
ON CONFLICT (id) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            insert_sql.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序: 记录 -> 占用 -> 奖品
        manager
            .drop_table(Table::drop().if_exists().table(DrawRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(BookingReservations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        Ok(())
    }
}
