use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::domain::agent::{AgentId, AgentType, IconKind, UsageUnit, CONVERSATIONAL, ESTIMATION};
use crate::errors::CatalogError;

/// Ordered, validated set of purchasable agents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentCatalog {
    agents: Vec<AgentType>,
}

impl AgentCatalog {
    pub fn new(agents: Vec<AgentType>) -> Result<Self, CatalogError> {
        validate_agents(&agents)?;
        Ok(Self { agents })
    }

    pub fn standard() -> Self {
        Self { agents: standard_agents() }
    }

    pub fn list_agent_types(&self) -> &[AgentType] {
        &self.agents
    }

    pub fn find(&self, agent_id: &AgentId) -> Option<&AgentType> {
        self.agents.iter().find(|agent| &agent.id == agent_id)
    }

    pub fn required_agent(&self) -> &AgentType {
        // validation guarantees exactly one required entry
        self.agents.iter().find(|agent| agent.required).unwrap_or(&self.agents[0])
    }

    /// Agents whose limit follows `source`.
    pub fn mirrors_of<'a>(&'a self, source: &'a AgentId) -> impl Iterator<Item = &'a AgentType> {
        self.agents.iter().filter(move |agent| agent.limit_source.as_ref() == Some(source))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn with_concurrency_surcharge(mut self, surcharge: Decimal) -> Self {
        for agent in &mut self.agents {
            if agent.concurrency_surcharge.is_some() {
                agent.concurrency_surcharge = Some(surcharge);
            }
        }
        self
    }
}

impl Default for AgentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_agents(agents: &[AgentType]) -> Result<(), CatalogError> {
    if agents.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen: HashSet<&AgentId> = HashSet::new();
    for agent in agents {
        if !seen.insert(&agent.id) {
            return Err(CatalogError::DuplicateAgent(agent.id.clone()));
        }
        if agent.base_limit == 0 {
            return Err(CatalogError::ZeroBaseLimit(agent.id.clone()));
        }
        let negative_surcharge =
            agent.concurrency_surcharge.map(|fee| fee < Decimal::ZERO).unwrap_or(false);
        if agent.base_price < Decimal::ZERO
            || agent.extra_unit_cost < Decimal::ZERO
            || negative_surcharge
        {
            return Err(CatalogError::NegativePrice(agent.id.clone()));
        }
    }

    let required = agents.iter().filter(|agent| agent.required).count();
    if required != 1 {
        return Err(CatalogError::RequiredAgentCount(required));
    }

    for (position, agent) in agents.iter().enumerate() {
        let Some(source) = &agent.limit_source else {
            continue;
        };
        let valid = agents[..position]
            .iter()
            .any(|earlier| &earlier.id == source && earlier.limit_source.is_none());
        if !valid {
            return Err(CatalogError::InvalidLimitSource {
                agent: agent.id.clone(),
                source_agent: source.clone(),
            });
        }
    }

    Ok(())
}

fn standard_agents() -> Vec<AgentType> {
    vec![
        AgentType {
            id: AgentId::from(CONVERSATIONAL),
            name: "Conversational Agent".to_owned(),
            description: "Handles new client meetings and lead onboarding".to_owned(),
            icon: IconKind::Bot,
            usage_unit: UsageUnit::Calls,
            base_price: Decimal::from(150),
            base_limit: 100,
            extra_unit_cost: Decimal::new(15, 1),
            features: features(&[
                "Natural conversation flow",
                "Lead qualification",
                "Meeting scheduling",
                "24/7 availability",
                "Multi-language support",
            ]),
            required: true,
            concurrency_surcharge: Some(Decimal::from(25)),
            limit_source: None,
        },
        AgentType {
            id: AgentId::from(ESTIMATION),
            name: "Estimation Agent".to_owned(),
            description: "Provides cost and resource estimation for projects".to_owned(),
            icon: IconKind::Calculator,
            usage_unit: UsageUnit::Estimations,
            base_price: Decimal::from(50),
            base_limit: 100,
            extra_unit_cost: Decimal::new(5, 1),
            features: features(&[
                "Automatic cost calculation",
                "Resource planning",
                "Timeline estimation",
                "Historical data analysis",
                "Custom pricing rules",
            ]),
            required: false,
            concurrency_surcharge: None,
            limit_source: Some(AgentId::from(CONVERSATIONAL)),
        },
    ]
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{standard_agents, AgentCatalog};
    use crate::domain::agent::{AgentId, CONVERSATIONAL, ESTIMATION};
    use crate::errors::CatalogError;

    #[test]
    fn standard_catalog_lists_agents_in_insertion_order() {
        let catalog = AgentCatalog::standard();
        let ids: Vec<&str> =
            catalog.list_agent_types().iter().map(|agent| agent.id.as_str()).collect();

        assert_eq!(ids, vec![CONVERSATIONAL, ESTIMATION]);
        assert_eq!(catalog.required_agent().id.as_str(), CONVERSATIONAL);
        assert_eq!(catalog.list_agent_types()[1].extra_unit_cost, Decimal::new(5, 1));
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = AgentCatalog::new(standard_agents()).expect("standard catalog is valid");
        assert_eq!(catalog, AgentCatalog::standard());
    }

    #[test]
    fn catalog_accepts_additional_entries() {
        let mut agents = standard_agents();
        let mut support = agents[1].clone();
        support.id = AgentId::from("support");
        support.limit_source = None;
        agents.push(support);

        let catalog = AgentCatalog::new(agents).expect("three-agent catalog");
        assert_eq!(catalog.len(), 3);
        assert!(catalog.find(&AgentId::from("support")).is_some());
    }

    #[test]
    fn rejects_duplicate_ids_and_zero_base_limits() {
        let mut duplicated = standard_agents();
        duplicated[1].id = AgentId::from(CONVERSATIONAL);
        duplicated[1].required = false;
        assert_eq!(
            AgentCatalog::new(duplicated),
            Err(CatalogError::DuplicateAgent(AgentId::from(CONVERSATIONAL)))
        );

        let mut zero_limit = standard_agents();
        zero_limit[1].base_limit = 0;
        assert_eq!(
            AgentCatalog::new(zero_limit),
            Err(CatalogError::ZeroBaseLimit(AgentId::from(ESTIMATION)))
        );
    }

    #[test]
    fn rejects_missing_anchor_and_forward_mirrors() {
        let mut no_anchor = standard_agents();
        no_anchor[0].required = false;
        assert_eq!(AgentCatalog::new(no_anchor), Err(CatalogError::RequiredAgentCount(0)));

        let mut reversed = standard_agents();
        reversed.reverse();
        assert!(matches!(
            AgentCatalog::new(reversed),
            Err(CatalogError::InvalidLimitSource { .. })
        ));

        assert_eq!(AgentCatalog::new(Vec::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn surcharge_override_only_touches_agents_that_bill_concurrency() {
        let catalog = AgentCatalog::standard().with_concurrency_surcharge(Decimal::from(40));
        let agents = catalog.list_agent_types();

        assert_eq!(agents[0].concurrency_surcharge, Some(Decimal::from(40)));
        assert_eq!(agents[1].concurrency_surcharge, None);
    }
}
