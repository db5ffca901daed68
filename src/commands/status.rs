use crate::services::{RecordSource, TapeStore};
use crate::utils::format_date;

pub async fn run() {
    let store = TapeStore::from_env();
    println!("📁 Tape directory: {}", store.data_dir().display());

    let dates = match store.list_dates().await {
        Ok(dates) => dates,
        Err(e) => {
            eprintln!("❌ Failed to read tape directory: {}", e);
            std::process::exit(1);
        }
    };

    if dates.is_empty() {
        println!("⚠️  No tape data found");
        return;
    }

    println!("📅 Trading dates: {}", dates.len());
    println!(
        "   First: {}  Latest: {}",
        format_date(dates[0]),
        format_date(dates[dates.len() - 1])
    );

    let latest = dates[dates.len() - 1];
    match store.list_stocks(latest).await {
        Ok(stocks) => {
            println!("📈 Stocks on {}: {}", format_date(latest), stocks.len());

            // Parse health of the most recent date, sampled over a few files
            let mut total_records = 0usize;
            for stock in stocks.iter().take(5) {
                match store.fetch(stock, latest).await {
                    Ok(records) => {
                        println!("   {} - {} records", stock, records.len());
                        total_records += records.len();
                    }
                    Err(e) => println!("   {} - read error: {}", stock, e),
                }
            }
            if stocks.len() > 5 {
                println!("   ... and {} more", stocks.len() - 5);
            }
            println!("✅ Sampled {} records", total_records);
        }
        Err(e) => eprintln!("❌ Failed to list stocks: {}", e),
    }
}
