pub mod calculations;
pub mod currency;
pub mod exchange;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ledger;
pub mod member;
pub(crate) mod member_validation;
pub mod money;
pub mod pool;
pub mod settings;

pub use calculations::{PoolMetrics, allocate, compute_total_amount, reconcile};
pub use currency::CurrencyFormat;
pub use exchange::{
    ExchangeError, ImportMode, ImportOutcome, ImportReport, export_members_to_csv,
    import_members_from_csv, parse_members_csv, write_members_csv,
};
pub use ledger::{AllocationSlice, AllocationSummary, BonusLedger, LedgerError};
pub use member::{MemberId, MemberUpdate, NewMember, TeamMember};
pub use pool::{AllocationStrategy, BonusPool};
pub use settings::{PoolSettings, SettingsError, load_settings_from_json, save_settings_to_json};
