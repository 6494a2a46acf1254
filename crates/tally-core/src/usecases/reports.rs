//! Home-screen figures computed over a date range

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::Repositories;
use crate::db::Snapshots;
use crate::error::{ensure, Result};
use crate::models::{Category, CategoryType, TransactionDetails};

/// Number of slots in the top-categories breakdown
const TOP_CATEGORIES: usize = 3;

/// Spend in one expense category; `category` is `None` for padding slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    pub category: Option<Category>,
    pub amount: f64,
    /// Share of the top categories' combined spend, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeReport {
    /// Income plus money lent
    pub income: f64,
    /// Expense plus money borrowed
    pub expense: f64,
    pub difference: f64,
    /// Always exactly three entries, largest spend first
    pub top_categories: Vec<CategoryExpense>,
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyExpense {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub amount: f64,
}

impl HomeReport {
    pub fn from_transactions(transactions: &[TransactionDetails]) -> Self {
        let mut income = 0.0;
        let mut expense = 0.0;
        let mut by_category: HashMap<i64, (Category, f64)> = HashMap::new();

        for details in transactions {
            let amount = details.transaction.amount;
            match details.category.category_type {
                CategoryType::Income | CategoryType::Lend => income += amount,
                CategoryType::Expense | CategoryType::Borrowing => {
                    expense += amount;
                    if details.category.category_type == CategoryType::Expense {
                        by_category
                            .entry(details.category.id)
                            .or_insert_with(|| (details.category.clone(), 0.0))
                            .1 += amount;
                    }
                }
                CategoryType::Transfer | CategoryType::Adjustment => {}
            }
        }

        let mut ranked: Vec<(Category, f64)> = by_category.into_values().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.id.cmp(&b.0.id)));
        ranked.truncate(TOP_CATEGORIES);

        let top_total: f64 = ranked.iter().map(|(_, amount)| amount).sum();
        let mut top_categories: Vec<CategoryExpense> = ranked
            .into_iter()
            .map(|(category, amount)| CategoryExpense {
                category: Some(category),
                amount,
                percentage: if top_total > 0.0 && amount > 0.0 {
                    amount / top_total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        top_categories.resize(
            TOP_CATEGORIES,
            CategoryExpense {
                category: None,
                amount: 0.0,
                percentage: 0.0,
            },
        );

        Self {
            income,
            expense,
            difference: income - expense,
            top_categories,
            has_data: !transactions.is_empty() && (income > 0.0 || expense > 0.0),
        }
    }
}

/// Expense totals for every calendar month (UTC) from `from` to `to`, zeros included
pub fn monthly_expenses(
    transactions: &[TransactionDetails],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<MonthlyExpense> {
    let mut totals: HashMap<(i32, u32), f64> = HashMap::new();
    for details in transactions {
        if details.category.category_type != CategoryType::Expense {
            continue;
        }
        let at = details.transaction.created_at;
        *totals.entry((at.year(), at.month())).or_default() += details.transaction.amount;
    }

    let mut months = Vec::new();
    let (mut year, mut month) = (from.year(), from.month());
    while (year, month) <= (to.year(), to.month()) {
        months.push(MonthlyExpense {
            year,
            month,
            amount: totals.get(&(year, month)).copied().unwrap_or(0.0),
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

#[derive(Clone)]
pub struct ReportUseCases {
    repos: Repositories,
}

impl ReportUseCases {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn home_report(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<HomeReport> {
        ensure(from <= to, "Start date must not be after end date")?;
        let transactions = self
            .repos
            .transactions
            .list_details_in_range(account_id, from, to)
            .await?;
        Ok(HomeReport::from_transactions(&transactions))
    }

    /// The home report, recomputed whenever its transactions change
    pub fn watch_home_report(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Snapshots<HomeReport>> {
        ensure(from <= to, "Start date must not be after end date")?;
        Ok(self
            .repos
            .transactions
            .watch_in_range_with(account_id, from, to, |transactions| {
                HomeReport::from_transactions(&transactions)
            }))
    }

    pub async fn monthly_expenses(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MonthlyExpense>> {
        ensure(from <= to, "Start date must not be after end date")?;
        let transactions = self
            .repos
            .transactions
            .list_details_in_range(account_id, from, to)
            .await?;
        Ok(monthly_expenses(&transactions, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{timestamp_now, Account, AccountType, Transaction};
    use chrono::TimeZone;

    fn category(id: i64, category_type: CategoryType) -> Category {
        Category {
            id,
            parent_id: None,
            title: format!("Category {}", id),
            icon: "other".to_string(),
            category_type,
        }
    }

    fn details(amount: f64, category: Category, at: DateTime<Utc>) -> TransactionDetails {
        TransactionDetails {
            transaction: Transaction {
                id: 0,
                amount,
                created_at: at,
                description: "t".to_string(),
                category_id: category.id,
                account_id: 1,
                event_id: None,
                location_id: None,
                lender_id: None,
                borrower_id: None,
                payee_ids: vec![],
            },
            category,
            account: Account {
                id: 1,
                user_id: 1,
                username: "Admin".to_string(),
                account_type: AccountType::Cash,
                balance: 0.0,
                created_at: at,
            },
            event: None,
            location: None,
            lender: None,
            borrower: None,
            payees: vec![],
        }
    }

    #[test]
    fn test_empty_report_is_padded() {
        let report = HomeReport::from_transactions(&[]);
        assert_eq!(report.income, 0.0);
        assert_eq!(report.expense, 0.0);
        assert!(!report.has_data);
        assert_eq!(report.top_categories.len(), 3);
        assert!(report.top_categories.iter().all(|c| c.category.is_none()));
    }

    #[test]
    fn test_report_totals_and_top_categories() {
        let now = timestamp_now();
        let food = category(1, CategoryType::Expense);
        let fuel = category(6, CategoryType::Expense);
        let report = HomeReport::from_transactions(&[
            details(1000.0, category(15, CategoryType::Income), now),
            details(200.0, category(20, CategoryType::Lend), now),
            details(300.0, food.clone(), now),
            details(100.0, fuel.clone(), now),
            details(50.0, category(21, CategoryType::Borrowing), now),
            details(999.0, category(22, CategoryType::Transfer), now),
        ]);

        assert_eq!(report.income, 1200.0);
        assert_eq!(report.expense, 450.0);
        assert_eq!(report.difference, 750.0);
        assert!(report.has_data);

        let top = &report.top_categories;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].category.as_ref().unwrap().id, food.id);
        assert_eq!(top[0].percentage, 75.0);
        assert_eq!(top[1].category.as_ref().unwrap().id, fuel.id);
        assert_eq!(top[1].percentage, 25.0);
        assert!(top[2].category.is_none());
    }

    #[test]
    fn test_transfers_alone_are_not_data() {
        let report = HomeReport::from_transactions(&[details(
            10.0,
            category(22, CategoryType::Transfer),
            timestamp_now(),
        )]);
        assert!(!report.has_data);
    }

    #[test]
    fn test_monthly_expenses_cover_every_month() {
        let from = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let dec = Utc.with_ymd_and_hms(2025, 12, 24, 12, 0, 0).unwrap();
        let food = category(1, CategoryType::Expense);

        let months = monthly_expenses(
            &[
                details(30.0, food.clone(), dec),
                details(12.5, food, dec),
                details(500.0, category(15, CategoryType::Income), dec),
            ],
            from,
            to,
        );

        let keys: Vec<(i32, u32)> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2025, 11), (2025, 12), (2026, 1), (2026, 2)]);
        assert_eq!(months[1].amount, 42.5);
        assert_eq!(months[0].amount, 0.0);
    }
}
