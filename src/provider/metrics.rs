//! Catalog of every metric id the factor groups read.
//!
//! Ids ending in `_good` are goodness scores (1 is best), ids ending in
//! `_bad` are badness scores (1 is worst). All are requested on a 0..1 scale.

pub const MACRO_COMPANY_SENSITIVITY: &str = "macro.company_sensitivity";
pub const MACRO_TIGHTNESS_INDEX: &str = "macro.tightness_index";

pub const CONSTRAINT_POWER_ACCESS: &str = "constraint.power_access_good";
pub const CONSTRAINT_COMPUTE_ACCESS: &str = "constraint.compute_access_good";

pub const TRUST_SECURITY_MATURITY: &str = "trust.security_maturity_good";
pub const TRUST_AUDITABILITY: &str = "trust.auditability_good";
pub const TRUST_PROVENANCE_SUPPORT: &str = "trust.provenance_support_good";
pub const TRUST_SECURITY_INCIDENT: &str = "trust.security_incident_bad";

pub const PLATFORM_DISTRIBUTION_LOCK: &str = "platform.distribution_lock_good";
pub const PLATFORM_SWITCHING_COST: &str = "platform.switching_cost_good";
pub const PLATFORM_DATA_ADVANTAGE: &str = "platform.data_advantage_good";
pub const PLATFORM_NETWORK_EFFECTS: &str = "platform.network_effects_good";

pub const ORG_SHIP_VELOCITY: &str = "org.ship_velocity_good";
pub const ORG_TALENT_DENSITY: &str = "org.talent_density_good";
pub const ORG_INTERNAL_AGENT_ADOPTION: &str = "org.internal_agent_adoption_good";
pub const ORG_RESTRUCTURE_VELOCITY: &str = "org.restructure_velocity_good";

pub const REG_COMPLIANCE_READINESS: &str = "reg.compliance_readiness_good";
pub const REG_LIABILITY_READINESS: &str = "reg.liability_readiness_good";
pub const GEO_EXPORT_CONTROL_EXPOSURE: &str = "geo.export_control_exposure_bad";
pub const GEO_SANCTIONS_EXPOSURE: &str = "geo.sanctions_exposure_bad";
pub const REG_ANTITRUST_RISK: &str = "reg.antitrust_risk_bad";

pub const CAPITAL_FREE_CASH_FLOW: &str = "capital.free_cash_flow_strength_good";
pub const CAPITAL_BALANCE_SHEET: &str = "capital.balance_sheet_strength_good";
pub const CAPITAL_MNA_SKILL: &str = "capital.mna_integration_skill_good";
pub const CAPITAL_DISCIPLINE: &str = "capital.allocation_discipline_good";
pub const CAPITAL_MOONSHOT: &str = "capital.moonshot_propensity_bad";

#[derive(Debug, Clone, Copy)]
pub struct MetricInfo {
    pub id: &'static str,
    pub description: &'static str,
}

const fn m(id: &'static str, description: &'static str) -> MetricInfo {
    MetricInfo { id, description }
}

pub const METRICS: &[MetricInfo] = &[
    m(MACRO_TIGHTNESS_INDEX, "1 = tight liquidity and high cost of capital"),
    m(MACRO_COMPANY_SENSITIVITY, "1 = highly sensitive to macro tightening (levered, long-duration, cyclical)"),
    m(CONSTRAINT_POWER_ACCESS, "secured power and interconnect path for scaling compute"),
    m(CONSTRAINT_COMPUTE_ACCESS, "accelerator, network and memory supply access"),
    m(TRUST_SECURITY_MATURITY, "controls, secure-by-default posture, response automation"),
    m(TRUST_AUDITABILITY, "logs, replay, approvals, compliance-grade tooling"),
    m(TRUST_PROVENANCE_SUPPORT, "content credentials and provenance integration"),
    m(TRUST_SECURITY_INCIDENT, "incident frequency, severity and repeat-ness; 1 is very bad"),
    m(PLATFORM_DISTRIBUTION_LOCK, "default placement in workflows, devices and platforms"),
    m(PLATFORM_SWITCHING_COST, "stickiness from integrations, data and process"),
    m(PLATFORM_DATA_ADVANTAGE, "proprietary data access that improves outcomes"),
    m(PLATFORM_NETWORK_EFFECTS, "marketplace, community or network effects strength"),
    m(ORG_SHIP_VELOCITY, "cadence and quality of shipping meaningful features"),
    m(ORG_TALENT_DENSITY, "ability to attract and retain top builders"),
    m(ORG_INTERNAL_AGENT_ADOPTION, "internal use of agents to compound productivity"),
    m(ORG_RESTRUCTURE_VELOCITY, "ability to change cost structure quickly"),
    m(REG_COMPLIANCE_READINESS, "certifications, audits, enterprise readiness"),
    m(REG_LIABILITY_READINESS, "contracts, insurance posture and governance controls"),
    m(GEO_EXPORT_CONTROL_EXPOSURE, "dependence on restricted components or markets"),
    m(GEO_SANCTIONS_EXPOSURE, "sanction risk for markets or supply chain"),
    m(REG_ANTITRUST_RISK, "constraints on M&A or bundling"),
    m(CAPITAL_FREE_CASH_FLOW, "resilient cash generation"),
    m(CAPITAL_BALANCE_SHEET, "low leverage, high liquidity"),
    m(CAPITAL_MNA_SKILL, "track record of successful integrations"),
    m(CAPITAL_DISCIPLINE, "kills bad projects, avoids capex traps"),
    m(CAPITAL_MOONSHOT, "tendency for desperate capex or unfocused bets"),
];
