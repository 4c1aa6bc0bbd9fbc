use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};

use wet_core::SystemClock;

use crate::config::Config;

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str, current: &str) -> Result<String> {
    write!(out, "{} [{}]: ", label, current)?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s).context("read answer")? == 0 {
        bail!("input closed during setup");
    }
    let s = s.trim();
    Ok(if s.is_empty() { current.to_string() } else { s.to_string() })
}

/// Ask until `parse` accepts the answer. Blank keeps `current`.
fn prompt_valid<R, W, T, F>(input: &mut R, out: &mut W, label: &str, current: &str, parse: F) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    loop {
        let answer = prompt(input, out, label, current)?;
        match parse(&answer) {
            Ok(v) => return Ok(v),
            Err(e) => writeln!(out, "  {e}")?,
        }
    }
}

fn parse_balance(s: &str) -> std::result::Result<f64, String> {
    let v: f64 = s
        .replace(',', "")
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{s}' is not a number"))
    }
}

fn parse_timezone(s: &str) -> std::result::Result<String, String> {
    SystemClock::from_name(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

/// Interactive setup over any reader/writer; returns the updated config.
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, mut cfg: Config) -> Result<Config> {
    writeln!(out, "WET setup\n")?;
    let balance = format!("{}", cfg.ledger.opening_balance);
    cfg.ledger.opening_balance = prompt_valid(input, out, "Opening balance", &balance, parse_balance)?;
    cfg.ledger.currency = prompt(input, out, "Currency", &cfg.ledger.currency)?;
    cfg.ledger.timezone = prompt_valid(input, out, "Timezone (IANA)", &cfg.ledger.timezone, parse_timezone)?;
    Ok(cfg)
}

pub fn run_setup(cfg: Config) -> Result<Config> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    ask(&mut input, &mut out, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_answers_are_applied() {
        let mut input = Cursor::new("12,500.50\nUSD\nEurope/Berlin\n");
        let mut out = Vec::new();
        let cfg = ask(&mut input, &mut out, Config::default()).unwrap();
        assert_eq!(cfg.ledger.opening_balance, 12500.5);
        assert_eq!(cfg.ledger.currency, "USD");
        assert_eq!(cfg.ledger.timezone, "Europe/Berlin");
    }

    #[test]
    fn test_blank_answers_keep_current() {
        let mut input = Cursor::new("\n\n\n");
        let mut out = Vec::new();
        let cfg = ask(&mut input, &mut out, Config::default()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_invalid_answers_are_asked_again() {
        let mut input = Cursor::new("lots\n100\n\nMars/Olympus\nAfrica/Nairobi\n");
        let mut out = Vec::new();
        let cfg = ask(&mut input, &mut out, Config::default()).unwrap();
        assert_eq!(cfg.ledger.opening_balance, 100.0);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("'lots' is not a number"));
        assert!(printed.contains("Mars/Olympus"));
    }
}
