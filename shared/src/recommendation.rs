//! Reorder recommendations
//!
//! Builds a plain-text report from current stock levels and the last month
//! of sales. The report is deterministic: the same products, sales and clock
//! always give the same text.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{Product, Transaction, TxType};
use crate::reporting::AmountOverflow;

/// Reorder level assumed for products whose level is zero
pub const FALLBACK_REORDER_LEVEL: i32 = 10;

/// Floor for any suggested order quantity
pub const MIN_SUGGESTED_ORDER: i64 = 20;

/// Number of well-stocked products listed before the rest are summarised
pub const WELL_STOCKED_SHOWN: usize = 5;

pub const NO_PRODUCTS_MESSAGE: &str =
    "No products found in your inventory. Please add some products first to get recommendations.";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Start of the sales window: midnight UTC on the same day-of-month one
/// calendar month back. A day past the end of the previous month rolls over
/// into the current one, so 31 March starts on 2 March.
pub fn analysis_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    let previous = first.checked_sub_months(Months::new(1)).unwrap_or(first);
    let day = previous
        .checked_add_days(Days::new(u64::from(today.day0())))
        .unwrap_or(previous);
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// A zero reorder level is treated as unset
pub fn effective_reorder_level(product: &Product) -> i32 {
    if product.reorder_level == 0 {
        FALLBACK_REORDER_LEVEL
    } else {
        product.reorder_level
    }
}

/// `max(level * 2, monthly_sales * 1.5, 20)`
pub fn suggested_order(reorder_level: i32, monthly_sales: i64) -> Decimal {
    let by_level = Decimal::from(i64::from(reorder_level) * 2);
    let by_sales = Decimal::from(monthly_sales) * Decimal::new(15, 1);
    by_level.max(by_sales).max(Decimal::from(MIN_SUGGESTED_ORDER))
}

/// Units sold per product across sales dated on or after `since`
pub fn monthly_sales(sales: &[Transaction], since: DateTime<Utc>) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for tx in sales
        .iter()
        .filter(|tx| tx.tx_type == TxType::Sale && tx.tx_date >= since)
    {
        for item in &tx.items {
            *totals.entry(item.product_id).or_insert(0) += i64::from(item.quantity);
        }
    }
    totals
}

/// A low-stock product with its suggested order
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub stock_qty: i32,
    pub reorder_level: i32,
    pub monthly_sales: i64,
    pub suggested_order: Decimal,
    pub estimated_cost: Decimal,
}

impl ReorderLine {
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_qty == 0
    }
}

/// A product above its reorder level
#[derive(Debug, Clone, PartialEq)]
pub struct StockedLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub stock_qty: i32,
    pub monthly_sales: i64,
    /// `None` when nothing sold in the window
    pub days_of_stock: Option<Decimal>,
}

/// Structured result behind the text report
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderAnalysis {
    pub products_analyzed: usize,
    pub sales_analyzed: usize,
    pub low_stock: Vec<ReorderLine>,
    pub well_stocked: Vec<StockedLine>,
    /// Sum of estimated costs, before rounding
    pub total_reorder_cost: Decimal,
}

/// Fails only when an estimated cost leaves the `Decimal` range
pub fn analyze(
    products: &[Product],
    sales: &[Transaction],
    now: DateTime<Utc>,
) -> Result<ReorderAnalysis, AmountOverflow> {
    let since = analysis_window_start(now);
    let sold = monthly_sales(sales, since);
    let sales_analyzed = sales
        .iter()
        .filter(|tx| tx.tx_type == TxType::Sale && tx.tx_date >= since)
        .count();

    let mut low_stock = Vec::new();
    let mut well_stocked = Vec::new();
    let mut total_reorder_cost = Decimal::ZERO;

    for product in products {
        let level = effective_reorder_level(product);
        let monthly_sales = sold.get(&product.id).copied().unwrap_or(0);
        let unit = unit_label(&product.unit).to_string();

        if product.stock_qty <= level {
            let suggested = suggested_order(level, monthly_sales);
            let estimated_cost = suggested.checked_mul(product.avg_cost).ok_or(AmountOverflow)?;
            total_reorder_cost = total_reorder_cost
                .checked_add(estimated_cost)
                .ok_or(AmountOverflow)?;
            low_stock.push(ReorderLine {
                product_id: product.id,
                name: product.name.clone(),
                unit,
                stock_qty: product.stock_qty,
                reorder_level: level,
                monthly_sales,
                suggested_order: suggested,
                estimated_cost,
            });
        } else {
            let days_of_stock = (monthly_sales > 0).then(|| {
                (Decimal::from(i64::from(product.stock_qty) * 30) / Decimal::from(monthly_sales))
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            });
            well_stocked.push(StockedLine {
                product_id: product.id,
                name: product.name.clone(),
                unit,
                stock_qty: product.stock_qty,
                monthly_sales,
                days_of_stock,
            });
        }
    }

    Ok(ReorderAnalysis {
        products_analyzed: products.len(),
        sales_analyzed,
        low_stock,
        well_stocked,
        total_reorder_cost,
    })
}

impl ReorderAnalysis {
    pub fn out_of_stock(&self) -> usize {
        self.low_stock.iter().filter(|l| l.is_out_of_stock()).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("🤖 AI INVENTORY ANALYSIS & REORDER RECOMMENDATIONS\n\n");
        out.push_str(RULE);
        out.push_str("\n\n");

        if !self.low_stock.is_empty() {
            out.push_str("🚨 URGENT: Low Stock Items Requiring Immediate Attention:\n\n");
            for (index, line) in self.low_stock.iter().enumerate() {
                let unit = &line.unit;
                out.push_str(&format!("{}. 📦 {}\n", index + 1, line.name));
                out.push_str(&format!("   • Current Stock: {} {}\n", line.stock_qty, unit));
                out.push_str(&format!("   • Reorder Level: {} {}\n", line.reorder_level, unit));
                out.push_str(&format!("   • Monthly Sales: {} {}\n", line.monthly_sales, unit));
                out.push_str(&format!(
                    "   • 💡 Suggested Order: {} {}\n",
                    line.suggested_order
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
                    unit
                ));
                out.push_str(&format!("   • 💰 Estimated Cost: ${}\n", money(line.estimated_cost)));
                out.push_str(&format!(
                    "   • ⚠️ Status: {}\n\n",
                    if line.is_out_of_stock() { "OUT OF STOCK" } else { "CRITICALLY LOW" }
                ));
            }
        }

        if !self.well_stocked.is_empty() {
            out.push_str("✅ WELL-STOCKED ITEMS (No immediate action needed):\n\n");
            for (index, line) in self.well_stocked.iter().take(WELL_STOCKED_SHOWN).enumerate() {
                let days = match line.days_of_stock {
                    Some(days) => days.to_string(),
                    None => "∞".to_string(),
                };
                out.push_str(&format!("{}. ✅ {}\n", index + 1, line.name));
                out.push_str(&format!("   • Current Stock: {} {}\n", line.stock_qty, line.unit));
                out.push_str(&format!("   • Days of Stock: {} days\n", days));
                out.push_str(&format!("   • Monthly Sales: {} {}\n\n", line.monthly_sales, line.unit));
            }
            if self.well_stocked.len() > WELL_STOCKED_SHOWN {
                out.push_str(&format!(
                    "... and {} more well-stocked items.\n\n",
                    self.well_stocked.len() - WELL_STOCKED_SHOWN
                ));
            }
        }

        out.push_str(RULE);
        out.push('\n');
        out.push_str("📊 INVENTORY SUMMARY:\n\n");
        out.push_str(&format!("• Total Products Analyzed: {}\n", self.products_analyzed));
        out.push_str(&format!("• 🚨 Low Stock Alerts: {}\n", self.low_stock.len()));
        out.push_str(&format!("• ✅ Well Stocked Items: {}\n", self.well_stocked.len()));
        out.push_str("• 📅 Analysis Period: Past 30 days\n");
        out.push_str(&format!("• 📈 Total Transactions Analyzed: {}\n\n", self.sales_analyzed));

        if !self.low_stock.is_empty() {
            out.push_str(&format!(
                "💰 Total Estimated Reorder Investment: ${}\n",
                money(self.total_reorder_cost)
            ));
            out.push_str(&format!(
                "🎯 Priority: {} items are completely out of stock\n\n",
                self.out_of_stock()
            ));
        }

        out.push_str("🧠 AI INSIGHTS:\n");
        out.push_str("• These recommendations are based on current stock levels, reorder points, and recent sales patterns\n");
        out.push_str("• Consider seasonal trends and upcoming promotions when placing orders\n");
        out.push_str("• Monitor fast-moving items more frequently\n");
        out.push_str("• Review reorder levels quarterly to optimize inventory turnover\n\n");

        out.push_str("📋 NEXT STEPS:\n");
        out.push_str("1. Review and approve urgent reorder recommendations\n");
        out.push_str("2. Contact suppliers for price quotes and delivery times\n");
        out.push_str("3. Update reorder levels based on recent sales trends\n");
        out.push_str("4. Set up automated alerts for critical stock levels");

        out
    }
}

/// Full reorder report text, or the empty-inventory notice
pub fn reorder_report(
    products: &[Product],
    sales: &[Transaction],
    now: DateTime<Utc>,
) -> Result<String, AmountOverflow> {
    if products.is_empty() {
        return Ok(NO_PRODUCTS_MESSAGE.to_string());
    }
    Ok(analyze(products, sales, now)?.render())
}

fn unit_label(unit: &str) -> &str {
    if unit.trim().is_empty() {
        "units"
    } else {
        unit
    }
}

fn money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Utc.from_utc_datetime(&date.and_hms_opt(15, 30, 0).unwrap())
    }

    fn product(name: &str, stock_qty: i32, reorder_level: i32, avg_cost: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sku: name.to_uppercase(),
            unit: "pcs".to_string(),
            stock_qty,
            reorder_level,
            avg_cost: Decimal::from_str(avg_cost).unwrap(),
            supplier_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(product: &Product, quantity: i32, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            tx_type: TxType::Sale,
            tx_date: date,
            items: vec![LineItem {
                product_id: product.id,
                quantity,
                unit_price: Decimal::ONE,
            }],
            note: None,
            created_at: date,
        }
    }

    #[test]
    fn test_window_start_same_day_last_month() {
        let start = analysis_window_start(at(2024, 6, 15));
        assert_eq!(start, Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(0, 0, 0).unwrap()
        ));
    }

    #[test]
    fn test_window_start_rolls_over_short_month() {
        let start = analysis_window_start(at(2024, 3, 31));
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        let start = analysis_window_start(at(2023, 3, 30));
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2023, 3, 2).unwrap());

        let start = analysis_window_start(at(2024, 1, 31));
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_reorder_cost_overflow_is_error() {
        let mut p = product("Bolt", 0, 5, "1");
        p.avg_cost = Decimal::MAX;
        assert_eq!(analyze(&[p.clone()], &[], at(2024, 6, 15)).unwrap_err(), AmountOverflow);
        assert!(reorder_report(&[p], &[], at(2024, 6, 15)).is_err());
    }

    #[test]
    fn test_suggested_order_floor_and_sales() {
        assert_eq!(suggested_order(5, 0), Decimal::from(20));
        assert_eq!(suggested_order(15, 0), Decimal::from(30));
        assert_eq!(suggested_order(5, 30), Decimal::from(45));
    }

    #[test]
    fn test_zero_reorder_level_uses_fallback() {
        let p = product("Bolt", 10, 0, "1");
        assert_eq!(effective_reorder_level(&p), 10);

        let analysis = analyze(&[p], &[], at(2024, 6, 15)).unwrap();
        assert_eq!(analysis.low_stock.len(), 1);
        assert_eq!(analysis.low_stock[0].reorder_level, 10);
    }

    #[test]
    fn test_monthly_sales_window() {
        let now = at(2024, 6, 15);
        let p = product("Nut", 1, 5, "1");
        let sales = vec![
            sale(&p, 4, at(2024, 6, 1)),
            sale(&p, 6, at(2024, 5, 15)),
            sale(&p, 100, at(2024, 5, 14)),
        ];

        let totals = monthly_sales(&sales, analysis_window_start(now));
        assert_eq!(totals.get(&p.id), Some(&10));

        let analysis = analyze(&[p], &sales, now).unwrap();
        assert_eq!(analysis.sales_analyzed, 2);
    }

    #[test]
    fn test_low_stock_line_costs() {
        let now = at(2024, 6, 15);
        let p = product("Washer", 0, 5, "2.50");
        let sales = vec![sale(&p, 30, at(2024, 6, 10))];

        let analysis = analyze(&[p], &sales, now).unwrap();
        let line = &analysis.low_stock[0];
        assert_eq!(line.suggested_order, Decimal::from(45));
        assert_eq!(line.estimated_cost, Decimal::from_str("112.5").unwrap());
        assert!(line.is_out_of_stock());
        assert_eq!(analysis.out_of_stock(), 1);
    }

    #[test]
    fn test_days_of_stock() {
        let now = at(2024, 6, 15);
        let p = product("Screw", 50, 5, "1");
        let sales = vec![sale(&p, 20, at(2024, 6, 10))];

        let analysis = analyze(&[p], &sales, now).unwrap();
        // 50 / 20 * 30 = 75
        assert_eq!(analysis.well_stocked[0].days_of_stock, Some(Decimal::from(75)));
    }

    #[test]
    fn test_empty_inventory_message() {
        assert_eq!(reorder_report(&[], &[], Utc::now()).unwrap(), NO_PRODUCTS_MESSAGE);
    }

    #[test]
    fn test_report_text() {
        let now = at(2024, 6, 15);
        let mut washer = product("Washer", 0, 5, "2.50");
        washer.unit = String::new();
        let screw = product("Screw", 50, 5, "1");
        let sales = vec![sale(&washer, 30, at(2024, 6, 10))];

        let report = reorder_report(&[washer, screw], &sales, now).unwrap();

        assert!(report.starts_with("🤖 AI INVENTORY ANALYSIS & REORDER RECOMMENDATIONS\n\n"));
        assert!(report.contains("1. 📦 Washer\n   • Current Stock: 0 units\n"));
        assert!(report.contains("   • 💡 Suggested Order: 45 units\n"));
        assert!(report.contains("   • 💰 Estimated Cost: $112.50\n"));
        assert!(report.contains("   • ⚠️ Status: OUT OF STOCK\n"));
        assert!(report.contains("1. ✅ Screw\n   • Current Stock: 50 pcs\n   • Days of Stock: ∞ days\n"));
        assert!(report.contains("• Total Products Analyzed: 2\n"));
        assert!(report.contains("• 📈 Total Transactions Analyzed: 1\n"));
        assert!(report.contains("💰 Total Estimated Reorder Investment: $112.50\n"));
        assert!(report.contains("🎯 Priority: 1 items are completely out of stock\n"));
        assert!(report.ends_with("4. Set up automated alerts for critical stock levels"));
    }

    #[test]
    fn test_well_stocked_list_capped() {
        let products: Vec<Product> = (0..8)
            .map(|i| product(&format!("Item{}", i), 100, 5, "1"))
            .collect();

        let report = reorder_report(&products, &[], at(2024, 6, 15)).unwrap();
        assert!(report.contains("5. ✅ Item4\n"));
        assert!(!report.contains("Item5"));
        assert!(report.contains("... and 3 more well-stocked items.\n"));
        assert!(!report.contains("URGENT"));
        assert!(!report.contains("Total Estimated Reorder Investment"));
    }
}
