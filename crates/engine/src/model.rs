//! # Workflow Model Definitions
//!
//! Data structures describing the demo workflow: the acting roles, the
//! identities that sign for them, and the steps issued against the published
//! module.
//!
//! ## Core Concepts
//!
//! - **Role**: which party (admin, merchant, user) authorizes a step
//! - **WorkflowStep**: one move call bound to a role, a target function and a
//!   positional argument list
//! - **CallArg**: an argument that is either a literal or a reference to an
//!   output produced earlier in the run (global object, minted object, an
//!   identity's address)
//! - **WorkflowSettings**: display URLs, stock and airdrop metadata used to
//!   build the fixed [`interaction_plan`]

use std::fmt;

use indexmap::IndexMap;
use momentx_api::Identity;
use momentx_types::LedgerAddress;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gas budget attached to every transaction unless configured otherwise.
pub const DEFAULT_GAS_BUDGET: u64 = 100_000;

/// Party that signs a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Merchant,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Merchant, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Merchant => "merchant",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three signing identities of the demo.
#[derive(Debug)]
pub struct Identities {
    pub admin: Identity,
    pub merchant: Identity,
    pub user: Identity,
}

impl Identities {
    pub fn get(&self, role: Role) -> &Identity {
        match role {
            Role::Admin => &self.admin,
            Role::Merchant => &self.merchant,
            Role::User => &self.user,
        }
    }

    /// Addresses keyed by role, in admin/merchant/user order.
    pub fn addresses(&self) -> IndexMap<Role, LedgerAddress> {
        Role::ALL.iter().map(|role| (*role, self.get(*role).address())).collect()
    }
}

/// Positional argument of a move call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// Passed through unchanged.
    Literal(Value),
    /// Shared object created when the module was published.
    GlobalObject,
    /// Object captured by an earlier step's extraction.
    MintedObject,
    /// Address of one of the demo identities.
    AddressOf(Role),
}

impl CallArg {
    pub fn literal(value: impl Into<Value>) -> Self {
        CallArg::Literal(value.into())
    }
}

/// Identifier a step captures from its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Created object whose type is `{package}::{type_suffix}`; recorded as the minted object.
    CreatedObject { type_suffix: String },
}

/// A single move call of the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub actor: Role,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    pub arguments: Vec<CallArg>,
    #[serde(default)]
    pub extract: Option<Extraction>,
}

impl WorkflowStep {
    /// Step named after the function it calls.
    pub fn call(actor: Role, module: &str, function: &str) -> Self {
        Self {
            name: function.to_string(),
            actor,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
            extract: None,
        }
    }

    pub fn arg(mut self, argument: CallArg) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn extracting(mut self, extraction: Extraction) -> Self {
        self.extract = Some(extraction);
        self
    }
}

/// Values the fixed interaction sequence is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    pub module_name: String,
    pub token_struct: String,
    pub initial_image_url: String,
    pub redeemed_image_url: String,
    pub stock_quantity: u64,
    pub airdrop_name: String,
    pub airdrop_description: String,
    pub gas_budget: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            module_name: "ylabs_nft".into(),
            token_struct: "YlabsNFT".into(),
            initial_image_url: "https://".into(),
            redeemed_image_url: "https://".into(),
            stock_quantity: 100,
            airdrop_name: "ylabs".into(),
            airdrop_description: "ylabs NFT".into(),
            gas_budget: DEFAULT_GAS_BUDGET,
        }
    }
}

impl WorkflowSettings {
    /// `module::Struct` part of the token's fully-qualified type.
    pub fn token_type_suffix(&self) -> String {
        format!("{}::{}", self.module_name, self.token_struct)
    }
}

/// The fixed merchant onboarding and redemption sequence.
///
/// Order matters: the merchant role must be granted before stock is set, and
/// the minted token id produced by `airdrop` feeds both redemption calls.
pub fn interaction_plan(settings: &WorkflowSettings) -> Vec<WorkflowStep> {
    let module = settings.module_name.as_str();
    vec![
        WorkflowStep::call(Role::Admin, module, "set_urls")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::literal(settings.initial_image_url.clone()))
            .arg(CallArg::literal(settings.redeemed_image_url.clone())),
        WorkflowStep::call(Role::Admin, module, "add_merchant")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::AddressOf(Role::Merchant)),
        WorkflowStep::call(Role::Merchant, module, "set_stock")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::literal(settings.stock_quantity.to_string())),
        WorkflowStep::call(Role::Admin, module, "airdrop")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::AddressOf(Role::User))
            .arg(CallArg::literal(settings.airdrop_name.clone()))
            .arg(CallArg::literal(settings.airdrop_description.clone()))
            .extracting(Extraction::CreatedObject {
                type_suffix: settings.token_type_suffix(),
            }),
        WorkflowStep::call(Role::Merchant, module, "redeem_request")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::MintedObject),
        WorkflowStep::call(Role::User, module, "redeem_confirm")
            .arg(CallArg::GlobalObject)
            .arg(CallArg::MintedObject)
            .arg(CallArg::AddressOf(Role::Merchant)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_follows_documented_order() {
        let plan = interaction_plan(&WorkflowSettings::default());
        let names: Vec<_> = plan.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(
            names,
            ["set_urls", "add_merchant", "set_stock", "airdrop", "redeem_request", "redeem_confirm"]
        );
        let actors: Vec<_> = plan.iter().map(|step| step.actor).collect();
        assert_eq!(
            actors,
            [Role::Admin, Role::Admin, Role::Merchant, Role::Admin, Role::Merchant, Role::User]
        );
    }

    #[test]
    fn only_airdrop_extracts_the_token() {
        let settings = WorkflowSettings::default();
        let plan = interaction_plan(&settings);
        let extracting: Vec<_> = plan.iter().filter(|step| step.extract.is_some()).collect();
        assert_eq!(extracting.len(), 1);
        assert_eq!(extracting[0].name, "airdrop");
        assert_eq!(
            extracting[0].extract,
            Some(Extraction::CreatedObject {
                type_suffix: "ylabs_nft::YlabsNFT".into()
            })
        );
    }

    #[test]
    fn stock_is_passed_as_decimal_string() {
        let settings = WorkflowSettings {
            stock_quantity: 42,
            ..Default::default()
        };
        let plan = interaction_plan(&settings);
        assert_eq!(plan[2].arguments[1], CallArg::literal("42"));
    }

    #[test]
    fn call_args_serialize_with_kind_tag() {
        let encoded = serde_json::to_value(CallArg::AddressOf(Role::Merchant)).unwrap();
        assert_eq!(encoded, serde_json::json!({"kind": "address_of", "value": "merchant"}));
        let global = serde_json::to_value(CallArg::GlobalObject).unwrap();
        assert_eq!(global, serde_json::json!({"kind": "global_object"}));
    }
}
