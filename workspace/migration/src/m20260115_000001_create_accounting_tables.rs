use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Chart of accounts
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string(Accounts::Code).unique_key())
                    .col(string(Accounts::Name))
                    .col(string_len(Accounts::AccountType, 20))
                    .col(string_null(Accounts::Description))
                    .col(boolean(Accounts::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        // Journals group the entries of one balanced business transaction
        manager
            .create_table(
                Table::create()
                    .table(Journals::Table)
                    .if_not_exists()
                    .col(pk_auto(Journals::Id))
                    .col(string(Journals::Description))
                    .col(timestamp_with_time_zone(Journals::PostedAt))
                    .to_owned(),
            )
            .await?;

        // General ledger (append-only)
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(LedgerEntries::Id))
                    .col(integer(LedgerEntries::AccountId))
                    .col(integer(LedgerEntries::JournalId))
                    .col(date(LedgerEntries::EntryDate))
                    .col(string(LedgerEntries::Description))
                    .col(decimal(LedgerEntries::Debit).decimal_len(16, 4))
                    .col(decimal(LedgerEntries::Credit).decimal_len(16, 4))
                    .col(string_len(LedgerEntries::ReferenceType, 20))
                    .col(integer_null(LedgerEntries::ReferenceId))
                    .col(timestamp_with_time_zone(LedgerEntries::PostedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entry_account")
                            .from(LedgerEntries::Table, LedgerEntries::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entry_journal")
                            .from(LedgerEntries::Table, LedgerEntries::JournalId)
                            .to(Journals::Table, Journals::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_account_date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::AccountId)
                    .col(LedgerEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        // Accounts payable sub-ledger
        manager
            .create_table(
                Table::create()
                    .table(Payables::Table)
                    .if_not_exists()
                    .col(pk_auto(Payables::Id))
                    .col(string(Payables::VendorName))
                    .col(string(Payables::InvoiceNumber).unique_key())
                    .col(date(Payables::InvoiceDate))
                    .col(date(Payables::DueDate))
                    .col(decimal(Payables::Amount).decimal_len(16, 4))
                    .col(decimal(Payables::PaidAmount).decimal_len(16, 4).default("0"))
                    .col(string_len(Payables::Status, 20))
                    .col(integer_null(Payables::LedgerEntryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payable_ledger_entry")
                            .from(Payables::Table, Payables::LedgerEntryId)
                            .to(LedgerEntries::Table, LedgerEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Accounts receivable sub-ledger
        manager
            .create_table(
                Table::create()
                    .table(Receivables::Table)
                    .if_not_exists()
                    .col(pk_auto(Receivables::Id))
                    .col(string(Receivables::CustomerName))
                    .col(string(Receivables::InvoiceNumber).unique_key())
                    .col(date(Receivables::InvoiceDate))
                    .col(date(Receivables::DueDate))
                    .col(decimal(Receivables::Amount).decimal_len(16, 4))
                    .col(
                        decimal(Receivables::ReceivedAmount)
                            .decimal_len(16, 4)
                            .default("0"),
                    )
                    .col(string_len(Receivables::Status, 20))
                    .col(integer_null(Receivables::LedgerEntryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receivable_ledger_entry")
                            .from(Receivables::Table, Receivables::LedgerEntryId)
                            .to(LedgerEntries::Table, LedgerEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Commission tiers
        manager
            .create_table(
                Table::create()
                    .table(CommissionTiers::Table)
                    .if_not_exists()
                    .col(pk_auto(CommissionTiers::Id))
                    .col(string(CommissionTiers::Name).unique_key())
                    .col(decimal(CommissionTiers::MinSales).decimal_len(16, 4))
                    .col(decimal(CommissionTiers::Rate).decimal_len(8, 4))
                    .to_owned(),
            )
            .await?;

        // Sales commissions, one row per salesperson and period
        manager
            .create_table(
                Table::create()
                    .table(SalesCommissions::Table)
                    .if_not_exists()
                    .col(pk_auto(SalesCommissions::Id))
                    .col(integer(SalesCommissions::SalespersonId))
                    .col(date(SalesCommissions::PeriodStart))
                    .col(date(SalesCommissions::PeriodEnd))
                    .col(
                        decimal(SalesCommissions::TotalSales)
                            .decimal_len(16, 4)
                            .default("0"),
                    )
                    .col(string_null(SalesCommissions::TierName))
                    .col(decimal(SalesCommissions::Rate).decimal_len(8, 4))
                    .col(decimal(SalesCommissions::CommissionAmount).decimal_len(16, 4))
                    .col(string_len(SalesCommissions::Status, 20))
                    .col(integer_null(SalesCommissions::LedgerEntryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_commission_ledger_entry")
                            .from(SalesCommissions::Table, SalesCommissions::LedgerEntryId)
                            .to(LedgerEntries::Table, LedgerEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_commissions_salesperson_period")
                    .table(SalesCommissions::Table)
                    .col(SalesCommissions::SalespersonId)
                    .col(SalesCommissions::PeriodStart)
                    .col(SalesCommissions::PeriodEnd)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Marketing campaigns and their expenses
        manager
            .create_table(
                Table::create()
                    .table(MarketingCampaigns::Table)
                    .if_not_exists()
                    .col(pk_auto(MarketingCampaigns::Id))
                    .col(string(MarketingCampaigns::Name))
                    .col(date(MarketingCampaigns::StartsOn))
                    .col(date_null(MarketingCampaigns::EndsOn))
                    .col(decimal(MarketingCampaigns::Budget).decimal_len(16, 4))
                    .col(
                        decimal(MarketingCampaigns::AttributedRevenue)
                            .decimal_len(16, 4)
                            .default("0"),
                    )
                    .col(boolean(MarketingCampaigns::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MarketingExpenses::Table)
                    .if_not_exists()
                    .col(pk_auto(MarketingExpenses::Id))
                    .col(integer_null(MarketingExpenses::CampaignId))
                    .col(date(MarketingExpenses::ExpenseDate))
                    .col(string(MarketingExpenses::Description))
                    .col(decimal(MarketingExpenses::Amount).decimal_len(16, 4))
                    .col(integer_null(MarketingExpenses::LedgerEntryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marketing_expense_campaign")
                            .from(MarketingExpenses::Table, MarketingExpenses::CampaignId)
                            .to(MarketingCampaigns::Table, MarketingCampaigns::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marketing_expense_ledger_entry")
                            .from(MarketingExpenses::Table, MarketingExpenses::LedgerEntryId)
                            .to(LedgerEntries::Table, LedgerEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Financial report snapshots (write-once)
        manager
            .create_table(
                Table::create()
                    .table(FinancialReports::Table)
                    .if_not_exists()
                    .col(pk_auto(FinancialReports::Id))
                    .col(string_len(FinancialReports::ReportType, 20))
                    .col(date(FinancialReports::PeriodStart))
                    .col(date(FinancialReports::PeriodEnd))
                    .col(text(FinancialReports::Figures))
                    .col(string(FinancialReports::GeneratedBy))
                    .col(timestamp_with_time_zone(FinancialReports::GeneratedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketingExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketingCampaigns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesCommissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommissionTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Receivables::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payables::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Journals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum Journals {
    Table,
    Id,
    Description,
    PostedAt,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    AccountId,
    JournalId,
    EntryDate,
    Description,
    Debit,
    Credit,
    ReferenceType,
    ReferenceId,
    PostedAt,
}

#[derive(DeriveIden)]
enum Payables {
    Table,
    Id,
    VendorName,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    Amount,
    PaidAmount,
    Status,
    LedgerEntryId,
}

#[derive(DeriveIden)]
enum Receivables {
    Table,
    Id,
    CustomerName,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    Amount,
    ReceivedAmount,
    Status,
    LedgerEntryId,
}

#[derive(DeriveIden)]
enum CommissionTiers {
    Table,
    Id,
    Name,
    MinSales,
    Rate,
}

#[derive(DeriveIden)]
enum SalesCommissions {
    Table,
    Id,
    SalespersonId,
    PeriodStart,
    PeriodEnd,
    TotalSales,
    TierName,
    Rate,
    CommissionAmount,
    Status,
    LedgerEntryId,
}

#[derive(DeriveIden)]
enum MarketingCampaigns {
    Table,
    Id,
    Name,
    StartsOn,
    EndsOn,
    Budget,
    AttributedRevenue,
    IsActive,
}

#[derive(DeriveIden)]
enum MarketingExpenses {
    Table,
    Id,
    CampaignId,
    ExpenseDate,
    Description,
    Amount,
    LedgerEntryId,
}

#[derive(DeriveIden)]
enum FinancialReports {
    Table,
    Id,
    ReportType,
    PeriodStart,
    PeriodEnd,
    Figures,
    GeneratedBy,
    GeneratedAt,
}
