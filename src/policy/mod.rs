mod storage;
mod types;

pub use storage::{get_settings_path, load_settings, save_settings};
pub use types::{BalanceSheetTrend, PolicySettings, RateLevel};
