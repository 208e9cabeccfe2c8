//! Bar-chart builders for the traffic report.
//!
//! Each builder returns a plain multi-line string (with embedded color
//! escapes) ready to drop into a [`crate::tile::Tile`]. Bars show uniques
//! as heavy blocks and the remaining total as light blocks, scaled to the
//! largest count in the window. A zero maximum scales everything to a
//! zero-width bar rather than failing.

use chrono::{Days, NaiveDate};

use crate::ansi::{BLUE, DKGREY, GREEN, GREY, PURPLE, RESET};
use crate::github::CountedItem;

const HEAVY_BLOCK: &str = "▓";
const LIGHT_BLOCK: &str = "░";

const MAX_BAR_LEN: u64 = 40;
pub const MAX_URL: usize = 38;
pub const MAX_REFERRER_URL: usize = 30;
const MAX_UNIQUE_URL_BAR: u64 = 5;
const MAX_COUNT_URL_BAR: u64 = 10;

/// A labeled count/uniques pair for the popular-paths and referrer charts.
#[derive(Debug, Clone)]
pub struct LabeledCount {
    pub label: String,
    pub count: u64,
    pub uniques: u64,
}

struct Totals {
    uniques: u64,
    count: u64,
    max_count: u64,
}

/// A daily chart: title line, one bar per day (most recent first, missing
/// days as zero rows), and a totals bar when more than one day is shown.
///
/// `ratio` annotates a bar with a uniques/count derived figure (e.g. views
/// per user); return an empty string to omit it.
pub fn counts_chart(
    title: &str,
    items: &[CountedItem],
    days: u32,
    today: NaiveDate,
    ratio: impl Fn(u64, u64) -> String,
) -> String {
    let totals = calc_totals(items, days, today);
    let width = totals.uniques.to_string().len() + 1;
    let factor = if totals.max_count == 0 {
        0.0
    } else {
        MAX_BAR_LEN as f64 / totals.max_count as f64
    };

    let mut chart = format!("{title}{DKGREY} unique & total{RESET}\n");
    chart.push_str(&daily_bars(items, days, today, factor, width, &ratio));
    if days > 1 {
        chart.push_str(&totals_bar(&totals, days, factor, width, &ratio));
        chart.push('\n');
    }
    chart
}

/// Sums uniques/count over the last `days` days and finds the max count
/// used for bar scaling.
fn calc_totals(items: &[CountedItem], days: u32, today: NaiveDate) -> Totals {
    let mut totals = Totals {
        uniques: 0,
        count: 0,
        max_count: 0,
    };
    let start = window_start(today, days);
    let size = items.len();
    for (i, item) in items.iter().enumerate() {
        if size - i > days as usize {
            continue;
        }
        if item.timestamp.date_naive() < start {
            continue;
        }
        totals.uniques += item.uniques;
        totals.count += item.count;
        totals.max_count = totals.max_count.max(item.count);
    }
    totals
}

/// One bar per day from the window start through today. The API omits
/// zero days, so a cursor walks the calendar and emits zero rows for the
/// gaps. Bars are emitted oldest-first and reversed at the end.
fn daily_bars(
    items: &[CountedItem],
    days: u32,
    today: NaiveDate,
    factor: f64,
    width: usize,
    ratio: &impl Fn(u64, u64) -> String,
) -> String {
    let mut bars: Vec<String> = Vec::new();
    let mut csr = window_start(today, days);
    let size = items.len();

    for (i, item) in items.iter().enumerate() {
        let ts = item.timestamp.date_naive();
        if size - i > days as usize {
            // Outside the requested window, but keep the cursor in step.
            if ts == csr {
                csr = next_day(csr);
            }
            continue;
        }
        if ts < csr {
            continue;
        }

        let mut gap = (ts - csr).num_days();
        while gap > 0 {
            bars.push(zero_bar(csr, width));
            csr = next_day(csr);
            gap -= 1;
        }
        csr = next_day(ts);

        let color = if ts == today { GREEN } else { BLUE };
        let uniques_width = (item.uniques as f64 * factor).ceil() as usize;
        let count_width =
            ((item.count as f64 * factor).ceil() as usize).saturating_sub(uniques_width);
        bars.push(format!(
            "{DKGREY}({}){}{RESET}{:>width$}{color}{}{}{RESET}{} {DKGREY}{}{RESET}\n",
            ts.format("%d %b"),
            day_letter(ts),
            item.uniques,
            HEAVY_BLOCK.repeat(uniques_width),
            LIGHT_BLOCK.repeat(count_width),
            item.count,
            ratio(item.uniques, item.count),
        ));
    }

    // Zero rows for any remaining days up to and including today.
    while csr <= today {
        bars.push(zero_bar(csr, width));
        csr = next_day(csr);
    }

    bars.iter().rev().cloned().collect()
}

fn zero_bar(date: NaiveDate, width: usize) -> String {
    format!(
        "{DKGREY}({}){}{:>width$}{RESET}\n",
        date.format("%d %b"),
        day_letter(date),
        0,
    )
}

fn totals_bar(
    totals: &Totals,
    days: u32,
    factor: f64,
    width: usize,
    ratio: &impl Fn(u64, u64) -> String,
) -> String {
    let mut bar = format!("{DKGREY}Total:   {RESET}");
    bar.push_str(&format!("{:>width$}", totals.uniques));
    if totals.count == 0 {
        return bar;
    }
    let uniques_width = (totals.uniques as f64 * factor / days as f64).ceil() as usize;
    let count_width = ((totals.count as f64 * factor / days as f64).ceil() as usize)
        .saturating_sub(uniques_width);
    bar.push_str(&format!(
        "{PURPLE}{}{}{RESET}{} {DKGREY}{}{RESET}",
        HEAVY_BLOCK.repeat(uniques_width),
        LIGHT_BLOCK.repeat(count_width),
        totals.count,
        ratio(totals.uniques, totals.count),
    ));
    bar
}

/// A ranked list chart for popular paths / referring sites: right-aligned
/// uniques, a short uniques bar, the (clipped) label, and a count-scaled
/// filler ending in the total count.
pub fn paths_chart(title: &str, max_url: usize, items: &[LabeledCount]) -> String {
    let max_uniques = items.iter().map(|i| i.uniques).max().unwrap_or(0);
    let max_count = items.iter().map(|i| i.count).max().unwrap_or(0);
    let mut chart = format!("{title}\n");
    for item in items {
        chart.push_str(&path_url_bar(
            &item.label,
            max_uniques,
            max_count,
            max_url,
            item.uniques,
            item.count,
        ));
    }
    chart
}

fn path_url_bar(
    url: &str,
    max_uniques: u64,
    max_count: u64,
    max_url: usize,
    uniques: u64,
    count: u64,
) -> String {
    let url = clip_url(url, max_url);
    let uniques_width = max_uniques.to_string().len();
    let factor_uniques = if max_uniques == 0 {
        0.0
    } else {
        MAX_UNIQUE_URL_BAR as f64 / max_uniques as f64
    };
    let factor_count = if max_count == 0 {
        0.0
    } else {
        MAX_COUNT_URL_BAR as f64 / max_count as f64
    };

    let uniques_bar = (factor_uniques * uniques as f64).ceil() as usize;
    let filler = max_url.saturating_sub(url.chars().count())
        + (factor_count * count as f64).ceil() as usize;
    format!(
        "{uniques:>uniques_width$}{GREY}{}{}{url}{}{RESET}{count}\n",
        HEAVY_BLOCK.repeat(uniques_bar),
        LIGHT_BLOCK.repeat((MAX_UNIQUE_URL_BAR as usize + 1).saturating_sub(uniques_bar)),
        LIGHT_BLOCK.repeat(filler),
    )
}

/// Keeps the last `max_url` characters of a long URL, then trims up to the
/// first path separator so the clip lands on a segment boundary.
pub fn clip_url(url: &str, max_url: usize) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() <= max_url {
        return url.to_string();
    }
    let tail: String = chars[chars.len() - max_url..].iter().collect();
    match tail.find('/') {
        Some(sep) if sep > 0 => tail[sep + 1..].to_string(),
        _ => tail,
    }
}

/// Total views per unique visitor, one decimal place, trailing `.0`
/// dropped. Zero uniques yields an empty annotation.
pub fn views_per_user(uniques: u64, total: u64) -> String {
    if uniques == 0 {
        return String::new();
    }
    let rounded = ((total as f64 / uniques as f64) * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as u64)
    } else {
        format!("{rounded:.1}")
    }
}

/// First letter of the English weekday name.
fn day_letter(date: NaiveDate) -> char {
    date.format("%A")
        .to_string()
        .chars()
        .next()
        .unwrap_or(' ')
}

fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(days.saturating_sub(1) as u64))
        .unwrap_or(today)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
