use crate::record::PortfolioId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("required column `{0}` not found in header")]
    MissingColumn(String),

    #[error("dataset has no records")]
    EmptyDataset,

    #[error("comparison needs two distinct portfolios, found {0}")]
    NotEnoughPortfolios(usize),

    #[error("reference portfolio `{0}` not present in dataset")]
    MissingPortfolio(PortfolioId),
}

pub type Result<T> = std::result::Result<T, Error>;
