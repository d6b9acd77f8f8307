//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for the family ledger:
//!
//! - `family_groups`: households owned by a user
//! - `memberships`: which users belong to which group
//! - `family_accounts`: shared pools inside a group
//! - `sub_accounts`: per-member accounts under a family account
//! - `fund_requests`: members asking their group for money
//! - `transactions`: immutable transfer records
//!
//! Account references in `transactions` are deliberately not FK-backed so
//! records outlive the accounts they touched; the `fund_requests` link is a
//! real FK that nulls out when the request goes away. The group reference on
//! `family_accounts` is likewise a plain column resolved by the engine.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum FamilyGroups {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Memberships {
    Table,
    Id,
    FamilyGroupId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum FamilyAccounts {
    Table,
    Id,
    FamilyGroupId,
    Name,
    Balance,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SubAccounts {
    Table,
    Id,
    FamilyAccountId,
    OwnerId,
    CreatedBy,
    Kind,
    Name,
    IsActive,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FundRequests {
    Table,
    Id,
    FamilyAccountId,
    SourceAccountId,
    RequestedBy,
    Amount,
    Reason,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Kind,
    Status,
    Direction,
    SubSourceAccount,
    SubDestinationAccount,
    FamilySourceAccount,
    FamilyDestinationAccount,
    Amount,
    Description,
    CreatedBy,
    FundRequestId,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FamilyGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FamilyGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FamilyGroups::OwnerId).string().not_null())
                    .col(ColumnDef::new(FamilyGroups::Name).string().not_null())
                    .col(ColumnDef::new(FamilyGroups::Description).string())
                    .col(
                        ColumnDef::new(FamilyGroups::IsDefault)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyGroups::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyGroups::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-family_groups-owner_id-name-unique")
                    .table(FamilyGroups::Table)
                    .col(FamilyGroups::OwnerId)
                    .col(FamilyGroups::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memberships::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Memberships::FamilyGroupId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Memberships::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Memberships::JoinedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-memberships-family_group_id")
                            .from(Memberships::Table, Memberships::FamilyGroupId)
                            .to(FamilyGroups::Table, FamilyGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-memberships-group-user-unique")
                    .table(Memberships::Table)
                    .col(Memberships::FamilyGroupId)
                    .col(Memberships::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FamilyAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FamilyAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FamilyAccounts::FamilyGroupId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FamilyAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(FamilyAccounts::Balance)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyAccounts::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyAccounts::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-family_accounts-group-name-unique")
                    .table(FamilyAccounts::Table)
                    .col(FamilyAccounts::FamilyGroupId)
                    .col(FamilyAccounts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubAccounts::FamilyAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubAccounts::OwnerId).string().not_null())
                    .col(ColumnDef::new(SubAccounts::CreatedBy).string().not_null())
                    .col(ColumnDef::new(SubAccounts::Kind).string().not_null())
                    .col(ColumnDef::new(SubAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(SubAccounts::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubAccounts::Balance)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubAccounts::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sub_accounts-family_account_id")
                            .from(SubAccounts::Table, SubAccounts::FamilyAccountId)
                            .to(FamilyAccounts::Table, FamilyAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sub_accounts-account-name-unique")
                    .table(SubAccounts::Table)
                    .col(SubAccounts::FamilyAccountId)
                    .col(SubAccounts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundRequests::FamilyAccountId).string())
                    .col(
                        ColumnDef::new(FundRequests::SourceAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundRequests::RequestedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundRequests::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundRequests::Reason).string())
                    .col(ColumnDef::new(FundRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(FundRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundRequests::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fund_requests-source_account_id")
                            .from(FundRequests::Table, FundRequests::SourceAccountId)
                            .to(SubAccounts::Table, SubAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fund_requests-family_account_id")
                            .from(FundRequests::Table, FundRequests::FamilyAccountId)
                            .to(FamilyAccounts::Table, FamilyAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::Direction).string().not_null())
                    .col(ColumnDef::new(Transactions::SubSourceAccount).string())
                    .col(ColumnDef::new(Transactions::SubDestinationAccount).string())
                    .col(ColumnDef::new(Transactions::FamilySourceAccount).string())
                    .col(ColumnDef::new(Transactions::FamilyDestinationAccount).string())
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Transactions::FundRequestId).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-fund_request_id")
                            .from(Transactions::Table, Transactions::FundRequestId)
                            .to(FundRequests::Table, FundRequests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FundRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FamilyAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FamilyGroups::Table).to_owned())
            .await?;
        Ok(())
    }
}
