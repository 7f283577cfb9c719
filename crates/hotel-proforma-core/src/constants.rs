//! Default assumption values applied when an input field is absent.
//!
//! Rates follow USALI-style allocation: each is a fraction of revenue,
//! of the fixed-cost base, or of property value — they are not required
//! to sum to 1.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Rate;

/// Projection horizon when none is supplied (10 years monthly)
pub const DEFAULT_HORIZON_MONTHS: usize = 120;

/// Average days per month used for room-night availability
pub const DAYS_PER_MONTH: Decimal = dec!(30.5);

/// Straight-line depreciation life for the building basis (years)
pub const DEPRECIATION_YEARS: Decimal = dec!(27.5);

/// Land fraction of purchase price (not depreciable)
pub const DEFAULT_LAND_VALUE_FRACTION: Rate = dec!(0.25);

/// Months between discrete occupancy ramp steps
pub const DEFAULT_OCCUPANCY_RAMP_MONTHS: u32 = 6;

/// Annual escalation applied to fixed expense lines
pub const DEFAULT_FIXED_COST_ESCALATION: Rate = dec!(0.03);

/// Property-level income tax rate
pub const DEFAULT_TAX_RATE: Rate = dec!(0.25);

// ---- Revenue shares (fractions of room revenue) ----

pub const DEFAULT_REV_SHARE_EVENTS: Rate = dec!(0.30);
pub const DEFAULT_REV_SHARE_FB: Rate = dec!(0.18);
pub const DEFAULT_REV_SHARE_OTHER: Rate = dec!(0.05);

/// F&B uplift from event catering
pub const DEFAULT_CATERING_BOOST: Rate = dec!(0.22);

// ---- Variable expense rates ----

pub const DEFAULT_COST_RATE_ROOMS: Rate = dec!(0.20);
pub const DEFAULT_COST_RATE_FB: Rate = dec!(0.09);
pub const DEFAULT_COST_RATE_MARKETING: Rate = dec!(0.01);
pub const DEFAULT_COST_RATE_FFE: Rate = dec!(0.04);

/// Direct cost rate on event revenue
pub const DEFAULT_EVENT_EXPENSE_RATE: Rate = dec!(0.65);

/// Direct cost rate on other ancillary revenue
pub const DEFAULT_OTHER_EXPENSE_RATE: Rate = dec!(0.60);

/// Share of the utilities rate treated as revenue-variable;
/// the remainder is a fixed, escalating line
pub const UTILITIES_VARIABLE_SPLIT: Rate = dec!(0.60);

// ---- Fixed expense rates (of base monthly revenue or property value) ----

pub const DEFAULT_COST_RATE_ADMIN: Rate = dec!(0.08);
pub const DEFAULT_COST_RATE_PROPERTY_OPS: Rate = dec!(0.04);
pub const DEFAULT_COST_RATE_UTILITIES: Rate = dec!(0.05);
pub const DEFAULT_COST_RATE_IT: Rate = dec!(0.005);
pub const DEFAULT_COST_RATE_OTHER: Rate = dec!(0.05);

/// Insurance, as annual fraction of total property value
pub const DEFAULT_COST_RATE_INSURANCE: Rate = dec!(0.02);

/// Property taxes, as annual fraction of total property value
pub const DEFAULT_COST_RATE_PROPERTY_TAXES: Rate = dec!(0.03);

// ---- Management fees ----

pub const DEFAULT_BASE_FEE_RATE: Rate = dec!(0.085);
pub const DEFAULT_INCENTIVE_FEE_RATE: Rate = dec!(0.12);

// ---- Valuation / disposition ----

pub const DEFAULT_EXIT_CAP_RATE: Rate = dec!(0.085);
pub const DEFAULT_SALES_COMMISSION: Rate = dec!(0.05);

// ---- Debt defaults ----

pub const DEFAULT_ACQUISITION_LTV: Rate = dec!(0.75);
pub const DEFAULT_REFINANCE_LTV: Rate = dec!(0.75);
pub const DEFAULT_DEBT_ANNUAL_RATE: Rate = dec!(0.09);
pub const DEFAULT_AMORTIZATION_YEARS: u32 = 25;
pub const DEFAULT_REFINANCE_CLOSING_RATE: Rate = dec!(0.03);
