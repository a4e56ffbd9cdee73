use clap::{Parser, Subcommand};

mod coupon;
mod db;
mod product;

#[derive(Debug, Parser)]
#[command(name = "fulfilment-app", about = "Fulfilment admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Product(product::ProductCommand),
    Coupon(coupon::CouponCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Product(command) => product::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
