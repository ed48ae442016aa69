//! Contract templates for the energy trading system.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Contract family understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateKind {
    #[serde(rename = "ERC20_TOKEN")]
    Erc20Token,
    Marketplace,
    Oracle,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Erc20Token => "ERC20_TOKEN",
            TemplateKind::Marketplace => "MARKETPLACE",
            TemplateKind::Oracle => "ORACLE",
        }
    }
}

/// A contract to create, keyed by the name it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractTemplate {
    pub key: String,
    pub kind: TemplateKind,
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Serialize)]
pub struct CreateContractRequest<'a> {
    pub template: TemplateKind,
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}

impl ContractTemplate {
    /// Body of `POST /api/v1/smart-contract/create`.
    pub fn request_body(&self) -> CreateContractRequest<'_> {
        CreateContractRequest {
            template: self.kind,
            name: &self.name,
            description: &self.description,
            parameters: &self.parameters,
        }
    }

    /// Energy Credit (EC) token.
    pub fn energy_token() -> Self {
        Self {
            key: "energyToken".into(),
            kind: TemplateKind::Erc20Token,
            name: "EnergyCredit".into(),
            description: "Energy Credit (EC) token for peer-to-peer energy trading".into(),
            parameters: json!({
                "name": "Energy Credit",
                "symbol": "EC",
                "decimals": 3,
                "initialSupply": 0,
                "mintable": true,
                "burnable": true,
                "pausable": true,
            }),
        }
    }

    /// Meter reading validation oracle.
    pub fn energy_oracle() -> Self {
        Self {
            key: "energyOracle".into(),
            kind: TemplateKind::Oracle,
            name: "EnergyOracle".into(),
            description: "Oracle service for IoT energy meter data validation".into(),
            parameters: json!({
                "validatorThreshold": 2,
                "readingValidityPeriod": 3600,
                "authorizedValidators": [],
                "dataTypes": ["production", "consumption", "storage"],
            }),
        }
    }

    /// Peer-to-peer marketplace. Fee is in basis points.
    pub fn energy_market() -> Self {
        Self {
            key: "energyMarket".into(),
            kind: TemplateKind::Marketplace,
            name: "EnergyMarketplace".into(),
            description: "Decentralized marketplace for energy trading".into(),
            parameters: json!({
                "feePercentage": 250,
                "minOfferAmount": 1000,
                "maxOfferDuration": 86400,
            }),
        }
    }
}

/// Token, oracle, market; in that order.
pub fn standard_plan() -> Vec<ContractTemplate> {
    vec![
        ContractTemplate::energy_token(),
        ContractTemplate::energy_oracle(),
        ContractTemplate::energy_market(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_order() {
        let keys: Vec<_> = standard_plan().into_iter().map(|t| t.key).collect();
        assert_eq!(keys, ["energyToken", "energyOracle", "energyMarket"]);
    }

    #[test]
    fn test_request_body_shape() {
        let template = ContractTemplate::energy_token();
        let body = serde_json::to_value(template.request_body()).unwrap();
        assert_eq!(body["template"], "ERC20_TOKEN");
        assert_eq!(body["name"], "EnergyCredit");
        assert_eq!(body["parameters"]["symbol"], "EC");
        assert_eq!(body["parameters"]["decimals"], 3);
    }

    #[test]
    fn test_kind_wire_names() {
        for kind in [TemplateKind::Erc20Token, TemplateKind::Marketplace, TemplateKind::Oracle] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }
}
