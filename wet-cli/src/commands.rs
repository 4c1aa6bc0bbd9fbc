//! Command handlers. Each opens what it needs, does one thing, and prints.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use wet_core::aggregate::recent;
use wet_core::time::month_from_name;
use wet_core::{BudgetItem, BudgetPeriod, Clock, NewTransaction, PeriodKey, SystemClock};
use wet_finance::{BudgetReport, DataFiles, Session, cashflow, fmt_money};

use crate::config::{Config, save_config};
use crate::state::resolve_data_dir;
use crate::{AddArgs, BudgetCommand, CategoriesCommand, PeriodArgs, setup};

pub struct App {
    cfg: Config,
    clock: SystemClock,
    session: Session,
}

impl App {
    pub fn open(cfg: Config, data_dir: Option<&Path>) -> Result<Self> {
        let clock = SystemClock::from_name(&cfg.ledger.timezone)
            .with_context(|| "check [ledger] timezone in config.toml")?;
        let dir = resolve_data_dir(data_dir, cfg.storage.data_dir.as_deref())?;
        let session = Session::open(DataFiles::in_dir(&dir), &clock, cfg.ledger.opening_balance)
            .with_fixed_categories(cfg.budget.fixed_categories.clone());
        debug!("data dir {}", dir.display());
        Ok(Self { cfg, clock, session })
    }

    fn money(&self, amount: f64) -> String {
        format!("{} {}", self.cfg.ledger.currency, fmt_money(amount))
    }

    pub fn cmd_add(&mut self, args: AddArgs) -> Result<()> {
        let date = args.date.unwrap_or_else(|| self.clock.today());
        let mut entry = NewTransaction::new(args.direction, date, args.amount, args.category.as_str())
            .with_fees(args.fees)
            .with_description(args.description);
        if let Some(s) = args.subcategory {
            entry = entry.with_subcategory(s);
        }
        if let Some(m) = args.payment_method {
            entry = entry.with_payment_method(m);
        }

        let taxonomy = self.session.taxonomy();
        let known = taxonomy.has_category(&args.category)
            || taxonomy.income_categories().contains(&args.category.as_str());
        if !known {
            warn!("category '{}' is not in categories.json", args.category);
        }

        let currency = self.cfg.ledger.currency.clone();
        match self.session.record(entry) {
            Ok(t) => {
                println!(
                    "Saved {}: {} {} | {} / {}",
                    t.direction,
                    currency,
                    fmt_money(t.amount.unwrap_or_default()),
                    t.category,
                    t.subcategory
                );
                Ok(())
            }
            Err(wet_core::Error::Validation(e)) => bail!("{e}"),
            Err(e) => {
                eprintln!("warning: {e} (the entry was not saved to disk)");
                Ok(())
            }
        }
    }

    pub fn cmd_list(&self, limit: usize) -> Result<()> {
        let txns = recent(self.session.transactions(), limit);
        if txns.is_empty() {
            println!("No transactions yet. Add one with: wet add");
            return Ok(());
        }
        println!(
            "{:<10}  {:<9}  {:>14}  {:<20}  {:<20}  {}",
            "date", "direction", "amount", "category", "subcategory", "description"
        );
        for t in txns {
            let date = t.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
            let amount = t.amount.map(fmt_money).unwrap_or_else(|| "?".to_string());
            println!(
                "{:<10}  {:<9}  {:>14}  {:<20}  {:<20}  {}",
                date,
                t.direction.to_string(),
                amount,
                t.category,
                t.subcategory,
                t.description()
            );
        }
        Ok(())
    }

    pub fn cmd_summary(&self, json: bool) -> Result<()> {
        let report = self.session.report();
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let s = &report.summary;
        println!("Opening balance   {}", self.money(s.opening_balance));
        println!("Total money in    {}", self.money(s.total_inflow));
        println!("Total money out   {}", self.money(s.total_outflow));
        println!("Transaction fees  {}", self.money(s.transaction_fees));
        println!("Surplus           {}", self.money(s.surplus));
        println!("Saved             {}", self.money(s.total_saved));
        println!("Net worth         {}", self.money(s.net_worth));
        println!("\n{} records", s.record_count);
        if s.unknown_count > 0 {
            println!("{} without a direction (excluded from totals)", s.unknown_count);
        }
        if s.invalid_amounts > 0 {
            println!("{} with an unreadable amount (excluded from totals)", s.invalid_amounts);
        }

        for (title, shares) in [("Spending by category", &report.expenses), ("Income by category", &report.income)] {
            if shares.is_empty() {
                continue;
            }
            println!("\n## {title}\n");
            for c in shares {
                println!("{:<24} {:>16} {:>6.1}%", c.category, self.money(c.total), c.share * 100.0);
            }
        }
        Ok(())
    }

    pub fn cmd_cashflow(&self, year: Option<i32>) -> Result<()> {
        let rows = cashflow(self.session.transactions(), year);
        if rows.is_empty() {
            println!("No dated transactions.");
            return Ok(());
        }
        println!("{:<8}  {:>16}  {:>16}  {:>16}", "month", "in", "out", "net");
        for r in rows {
            println!(
                "{:<8}  {:>16}  {:>16}  {:>16}",
                r.month.to_string(),
                fmt_money(r.inflow),
                fmt_money(r.outflow),
                fmt_money(r.net())
            );
        }
        Ok(())
    }

    pub fn cmd_export(&self, out: Option<&Path>) -> Result<()> {
        match self.session.export(out) {
            Ok((path, n)) => println!("Exported {} transactions to {}", n, path.display()),
            Err(e) => eprintln!("warning: export failed: {e:#}"),
        }
        Ok(())
    }

    pub fn cmd_import(&mut self, file: Option<PathBuf>) -> Result<()> {
        let path = file.unwrap_or_else(|| self.session.files().legacy_transactions.clone());
        let n = self.session.import_file(&path)?;
        println!("Imported {} records from {}", n, path.display());
        if let Err(e) = self.session.save_transactions() {
            eprintln!("warning: {e} (imported records were not saved to disk)");
        }
        Ok(())
    }

    pub fn cmd_budget(&mut self, command: BudgetCommand) -> Result<()> {
        match command {
            BudgetCommand::Show { period } => {
                let key = resolve_period(&period, &self.clock)?;
                self.print_budget(&key);
                return Ok(());
            }
            BudgetCommand::SetOverall { period, amount } => {
                let key = resolve_period(&period, &self.clock)?;
                self.session.budget_mut(&key).set_overall(amount)?;
                println!("{key}: overall budget {}", self.money(amount));
            }
            BudgetCommand::Add {
                period,
                category,
                subcategory,
                amount,
            } => {
                let key = resolve_period(&period, &self.clock)?;
                check_amount(amount)?;
                let category = match category {
                    Some(c) => c,
                    None => self
                        .session
                        .taxonomy()
                        .category_for_subcategory(&subcategory)
                        .map(str::to_string)
                        .with_context(|| format!("no category lists '{subcategory}'; pass --category"))?,
                };
                let budget = self.session.budget_mut(&key);
                budget.add_item(BudgetItem::new(category, subcategory, amount));
                println!("{key}: {} items, {} budgeted", budget.items.len(), fmt_money(budget.total_budgeted()));
            }
            BudgetCommand::Edit {
                period,
                index,
                category,
                subcategory,
                amount,
            } => {
                let key = resolve_period(&period, &self.clock)?;
                check_amount(amount)?;
                let idx = item_index(index)?;
                self.session
                    .budget_mut(&key)
                    .edit_item(idx, BudgetItem::new(category, subcategory, amount))?;
                println!("{key}: item {index} updated");
            }
            BudgetCommand::Remove { period, index } => {
                let key = resolve_period(&period, &self.clock)?;
                let removed = self.session.budget_mut(&key).remove_item(item_index(index)?)?;
                println!("{key}: removed {} / {}", removed.category, removed.subcategory);
            }
            BudgetCommand::Clear { period } => {
                let key = resolve_period(&period, &self.clock)?;
                self.session.budget_mut(&key).clear_items();
                println!("{key}: all items removed");
            }
        }

        if let Err(e) = self.session.save_budgets() {
            eprintln!("warning: {e} (budget changes were not saved)");
        }
        Ok(())
    }

    fn print_budget(&self, key: &PeriodKey) {
        let empty = BudgetPeriod::default();
        let period = self.session.budget(key).unwrap_or(&empty);
        let report = BudgetReport::new(key, period, self.session.fixed_categories());
        let p = &report.progress;

        println!("# {}\n", report.key);
        println!("Overall budget  {}", self.money(p.overall));
        if period.items.is_empty() {
            println!("\nNo budget items.");
        } else {
            println!();
            for (i, item) in period.items.iter().enumerate() {
                println!(
                    "{:>3}. {:<24} {:<24} {:>16}",
                    i + 1,
                    item.category,
                    item.subcategory,
                    fmt_money(item.amount)
                );
            }
        }
        println!("\nBudgeted  {} ({:.0}%)", self.money(p.total), p.total_ratio * 100.0);
        println!("Fixed     {} ({:.0}%)", self.money(p.fixed), p.fixed_ratio * 100.0);
        println!("Variable  {} ({:.0}%)", self.money(p.variable), p.variable_ratio * 100.0);
        println!("\n{}", p.advice.message());
        if p.fixed_heavy {
            println!("Fixed costs take more than 60% of the budget.");
        }
    }

    pub fn cmd_categories(&mut self, command: CategoriesCommand) -> Result<()> {
        let taxonomy = self.session.taxonomy_mut();
        let added = match command {
            CategoriesCommand::List => {
                let taxonomy = self.session.taxonomy();
                println!("## Expense categories\n");
                for cat in taxonomy.main_categories() {
                    println!("{cat}");
                    for sub in taxonomy.subcategories_for(cat) {
                        println!("  - {sub}");
                    }
                }
                println!("\n## Income categories\n");
                for cat in taxonomy.income_categories() {
                    println!("{cat}");
                }
                println!(
                    "\n{} categories, {} subcategories",
                    taxonomy.main_categories().len(),
                    taxonomy.all_subcategories().len()
                );
                return Ok(());
            }
            CategoriesCommand::Add { name } => taxonomy.add_category(name),
            CategoriesCommand::AddSubcategory { category, name } => {
                if !taxonomy.has_category(&category) {
                    bail!("no expense category named '{category}'");
                }
                taxonomy.add_subcategory(&category, name)
            }
            CategoriesCommand::AddIncome { name } => taxonomy.add_income_category(name),
        };

        if !added {
            println!("Already present, nothing to do.");
            return Ok(());
        }
        match self.session.save_categories() {
            Ok(()) => println!("Saved {}", self.session.files().categories.display()),
            Err(e) => eprintln!("warning: {e} (category changes were not saved)"),
        }
        Ok(())
    }
}

pub fn cmd_setup(config_path: &Path, cfg: Config, data_dir: Option<&Path>) -> Result<()> {
    let cfg = setup::run_setup(cfg)?;
    save_config(config_path, &cfg)?;
    let app = App::open(cfg, data_dir)?;

    println!("\nWrote {}", config_path.display());
    println!("Data directory: {}", app.session.files().dir.display());
    println!("Current budget period: {}", app.session.current_period());
    println!("\nNext: wet add --direction in --amount 1000 --category Salary --description Salary");
    Ok(())
}

pub fn cmd_config_show(config_path: &Path, cfg: &Config) -> Result<()> {
    println!("# {}\n", config_path.display());
    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
    Ok(())
}

/// Period key from `--month/--week/--year`, defaulting each to today's.
fn resolve_period(args: &PeriodArgs, clock: &dyn Clock) -> Result<PeriodKey> {
    let month = match &args.month {
        Some(m) => m
            .trim()
            .parse::<u32>()
            .ok()
            .or_else(|| month_from_name(m))
            .with_context(|| format!("unknown month '{m}'"))?,
        None => clock.current_month(),
    };
    let year = args.year.unwrap_or_else(|| clock.current_year());
    let week = args.week.unwrap_or_else(|| clock.current_week());
    Ok(PeriodKey::new(month, year, week)?)
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount must be a non-negative number, got {amount}");
    }
    Ok(())
}

/// Items are numbered from 1 on screen.
fn item_index(shown: usize) -> Result<usize> {
    shown.checked_sub(1).context("item numbers start at 1")
}
