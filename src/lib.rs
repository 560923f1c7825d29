pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod schedule;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{EngineConfig, LoanTerms};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result, SimulationScenario};
pub use events::{Event, EventStore};
pub use loan::Loan;
pub use payments::{
    derive_aggregates, simulate_payoff, LoanAggregates, LoanPayment, NewPayment, PaymentApplied,
    PaymentHistory, PaymentReconciler, PaymentRemoved, PayoffProjection, PayoffSimulator,
    TermsChanged,
};
pub use schedule::{calculate_monthly_payment, generate_schedule, AmortizationEntry, LoanSchedule};
pub use serialization::LoanView;
pub use types::{LoanId, LoanStatus, PaymentFrequency, PaymentId, PaymentMethod, PaymentStatus};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
