pub mod amortization;
pub mod calendar;
pub mod generator;

pub use amortization::{monthly_payment, validate_terms};
pub use calendar::{add_months, days_late};
pub use generator::{
    apply_final_installment_correction, generate_schedule, verify_schedule, AmortizationSchedule,
    ScheduledPayment,
};
