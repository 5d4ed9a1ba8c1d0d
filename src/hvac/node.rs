//! Explicit node graph of the HVAC network.
//!
//! Nodes live in an arena owned by [`NodeRegistry`]. A node is allocated once under a
//! unique name; components then connect to it with a typed [`NodeRole`]. Every
//! connection is checked against the roles already asserted on the node, so two
//! incompatible uses of the same name fail at construction time instead of in the
//! simulation engine's parser.

use crate::error::ValidationError;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Which side of an air loop a declaration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSide {
    Supply,
    Demand,
}

/// How an owner uses a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Air enters a component.
    ComponentInlet,
    /// Air leaves a component.
    ComponentOutlet,
    LoopSupplyInlet,
    LoopSupplyOutlet,
    LoopDemandInlet,
    LoopDemandOutlet,
    SupplyPathInlet,
    ReturnPathOutlet,
    ZoneAir,
    ZoneInlet,
    ZoneReturn,
    ZoneExhaust,
    OutdoorAir,
    Relief,
    /// Written by a setpoint manager. A node accepts a single writer.
    SetpointTarget,
    /// Read by a controller or setpoint manager.
    Sensor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Producer,
    Consumer,
    Declaration,
    Reference,
}

impl NodeRole {
    pub fn kind(&self) -> RoleKind {
        match self {
            Self::ComponentOutlet => RoleKind::Producer,
            Self::ComponentInlet => RoleKind::Consumer,
            Self::SetpointTarget | Self::Sensor => RoleKind::Reference,
            _ => RoleKind::Declaration,
        }
    }

    pub fn side(&self) -> Option<LoopSide> {
        match self {
            Self::LoopSupplyInlet | Self::LoopSupplyOutlet | Self::OutdoorAir | Self::Relief => {
                Some(LoopSide::Supply)
            }
            Self::LoopDemandInlet
            | Self::LoopDemandOutlet
            | Self::SupplyPathInlet
            | Self::ReturnPathOutlet => Some(LoopSide::Demand),
            _ => None,
        }
    }

    /// Declarations where air leaves the graph. No component may consume from them.
    pub fn is_sink(&self) -> bool {
        matches!(
            self,
            Self::LoopSupplyOutlet
                | Self::LoopDemandOutlet
                | Self::ReturnPathOutlet
                | Self::ZoneInlet
                | Self::Relief
        )
    }

    /// Declarations where air enters the graph. No component may produce into them.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            Self::LoopSupplyInlet
                | Self::LoopDemandInlet
                | Self::SupplyPathInlet
                | Self::OutdoorAir
                | Self::ZoneReturn
                | Self::ZoneExhaust
        )
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One assertion made about a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeUse {
    pub owner: String,
    /// Enclosing compound object, e.g. the air distribution unit around a reheat coil.
    pub parent: Option<String>,
    pub role: NodeRole,
}

impl NodeUse {
    pub fn new(owner: &str, parent: Option<&str>, role: NodeRole) -> Self {
        Self {
            owner: owner.to_string(),
            parent: parent.map(str::to_string),
            role,
        }
    }

    /// Same owner, parent and child, or two children of the same compound object.
    fn related(&self, other: &NodeUse) -> bool {
        self.owner == other.owner
            || self.parent.as_deref() == Some(other.owner.as_str())
            || other.parent.as_deref() == Some(self.owner.as_str())
            || (self.parent.is_some() && self.parent == other.parent)
    }
}

impl fmt::Display for NodeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.owner, self.role)
    }
}

/// Pairs of declarations allowed on the same node.
const COMPATIBLE_DECLARATIONS: [(NodeRole, NodeRole); 2] = [
    (NodeRole::LoopDemandInlet, NodeRole::SupplyPathInlet),
    (NodeRole::LoopDemandOutlet, NodeRole::ReturnPathOutlet),
];

/// Why `a` and `b` cannot both be asserted on one node, if they cannot.
pub fn conflict(a: &NodeUse, b: &NodeUse) -> Option<&'static str> {
    use RoleKind::*;
    if a.owner == b.owner && a.role == b.role {
        return Some("the same role is declared twice");
    }
    match (a.role.kind(), b.role.kind()) {
        (Producer, Producer) if !a.related(b) => Some("a node has a single producing component"),
        (Consumer, Consumer) if !a.related(b) => Some("a node has a single consuming component"),
        (Producer, Consumer) | (Consumer, Producer) if a.owner == b.owner => {
            Some("a component cannot feed its own inlet")
        }
        (Declaration, Declaration) => {
            let pair_ok = COMPATIBLE_DECLARATIONS
                .iter()
                .any(|&(x, y)| (a.role, b.role) == (x, y) || (a.role, b.role) == (y, x));
            if pair_ok {
                None
            } else if a.role.side().is_some() && b.role.side().is_some() && a.role.side() != b.role.side() {
                Some("a node cannot sit on both the supply and the demand side")
            } else {
                Some("a node carries a single boundary declaration")
            }
        }
        (Declaration, other) => declaration_conflict(a.role, other),
        (other, Declaration) => declaration_conflict(b.role, other),
        (Reference, Reference) if a.role == NodeRole::SetpointTarget && b.role == NodeRole::SetpointTarget => {
            Some("a node accepts a single setpoint manager")
        }
        _ => None,
    }
}

fn declaration_conflict(declared: NodeRole, other: RoleKind) -> Option<&'static str> {
    match other {
        RoleKind::Consumer if declared.is_sink() => Some("nothing may consume from an outlet declaration"),
        RoleKind::Producer if declared.is_source() => Some("nothing may produce into an inlet declaration"),
        RoleKind::Consumer | RoleKind::Producer if declared == NodeRole::ZoneAir => {
            Some("the zone air node is not part of the air path")
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Who allocated the name.
    pub allocated_by: String,
    pub uses: Vec<NodeUse>,
}

impl Node {
    pub fn uses_of(&self, kind: RoleKind) -> impl Iterator<Item = &NodeUse> {
        self.uses.iter().filter(move |u| u.role.kind() == kind)
    }

    pub fn has_role(&self, role: NodeRole) -> bool {
        self.uses.iter().any(|u| u.role == role)
    }

    /// Innermost producing component, i.e. the one without a producing parent.
    pub fn producer(&self) -> Option<&NodeUse> {
        innermost(self.uses_of(RoleKind::Producer).collect())
    }

    pub fn consumer(&self) -> Option<&NodeUse> {
        innermost(self.uses_of(RoleKind::Consumer).collect())
    }
}

/// Picks the use whose owner is not the parent of another use in the list.
fn innermost(uses: Vec<&NodeUse>) -> Option<&NodeUse> {
    uses.iter()
        .find(|u| {
            !uses
                .iter()
                .any(|other| other.parent.as_deref() == Some(u.owner.as_str()))
        })
        .copied()
}

/// Arena of named nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new node. Fails if the name is already taken.
    pub fn allocate(&mut self, name: &str, owner: &str) -> Result<NodeId, ValidationError> {
        if let Some(id) = self.index.get(name) {
            return Err(ValidationError::NodeNameCollision {
                node: name.to_string(),
                existing_owner: self.nodes[id.0].allocated_by.clone(),
                owner: owner.to_string(),
            });
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            allocated_by: owner.to_string(),
            uses: Vec::new(),
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Asserts a role on a node, checking it against every role already asserted.
    pub fn connect(&mut self, id: NodeId, usage: NodeUse) -> Result<(), ValidationError> {
        let node = self.nodes.get_mut(id.0).ok_or_else(|| ValidationError::DanglingNode {
            node: format!("#{}", id.0),
            reason: "unknown node id".to_string(),
        })?;
        for existing in &node.uses {
            if let Some(rule) = conflict(existing, &usage) {
                return Err(ValidationError::IncompatibleNodeRoles {
                    node: node.name.clone(),
                    first: existing.to_string(),
                    second: usage.to_string(),
                    rule,
                });
            }
        }
        node.uses.push(usage);
        Ok(())
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Name of a node. Ids are only handed out by this registry.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Re-checks every pair of roles on a node.
    pub fn check_roles(&self, id: NodeId) -> Result<(), ValidationError> {
        let node = self.node(id);
        for (i, a) in node.uses.iter().enumerate() {
            for b in &node.uses[i + 1..] {
                if let Some(rule) = conflict(a, b) {
                    return Err(ValidationError::IncompatibleNodeRoles {
                        node: node.name.clone(),
                        first: a.to_string(),
                        second: b.to_string(),
                        rule,
                    });
                }
            }
        }
        Ok(())
    }

    /// Fails if air can enter the node but not leave it, or the other way round.
    pub fn check_dangling(&self, id: NodeId) -> Result<(), ValidationError> {
        let node = self.node(id);
        let produced = node.producer().is_some() || node.uses.iter().any(|u| u.role.is_source());
        let consumed = node.consumer().is_some() || node.uses.iter().any(|u| u.role.is_sink());
        let reason = match (produced, consumed) {
            _ if node.has_role(NodeRole::ZoneAir) => return Ok(()),
            (true, true) => return Ok(()),
            (false, false) => "no component is connected",
            (true, false) => "air enters but nothing consumes it",
            (false, true) => "air is consumed but nothing produces it",
        };
        Err(ValidationError::DanglingNode {
            node: node.name.clone(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by(owner: &str, role: NodeRole) -> NodeUse {
        NodeUse {
            owner: owner.to_string(),
            parent: None,
            role,
        }
    }

    #[test]
    fn test_allocate_twice_fails() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        reg.allocate("N1", "Loop1")?;
        let err = reg.allocate("N1", "Loop2").unwrap_err();
        assert!(matches!(err, ValidationError::NodeNameCollision { .. }));
        Ok(())
    }

    #[test]
    fn test_producer_consumer_pair() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("Fan_Inlet", "Loop")?;
        reg.connect(n, by("Coil", NodeRole::ComponentOutlet))?;
        reg.connect(n, by("Fan", NodeRole::ComponentInlet))?;
        reg.check_roles(n)?;
        reg.check_dangling(n)?;
        assert_eq!(reg.node(n).producer().unwrap().owner, "Coil");
        // A second inlet on the same node is rejected
        assert!(reg.connect(n, by("Other", NodeRole::ComponentInlet)).is_err());
        Ok(())
    }

    #[test]
    fn test_supply_outlet_cannot_be_demand_inlet() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("Loop_SupplyOutlet", "Loop")?;
        reg.connect(n, by("Loop", NodeRole::LoopSupplyOutlet))?;
        let err = reg.connect(n, by("Loop", NodeRole::LoopDemandInlet)).unwrap_err();
        match err {
            ValidationError::IncompatibleNodeRoles { rule, .. } => {
                assert_eq!(rule, "a node cannot sit on both the supply and the demand side")
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_supply_outlet_cannot_feed_a_component() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("Loop_SupplyOutlet", "Loop")?;
        reg.connect(n, by("Fan", NodeRole::ComponentOutlet))?;
        reg.connect(n, by("Loop", NodeRole::LoopSupplyOutlet))?;
        assert!(reg.connect(n, by("Splitter", NodeRole::ComponentInlet)).is_err());
        Ok(())
    }

    #[test]
    fn test_demand_inlet_and_supply_path_inlet_share_a_node() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("Loop_ZoneEquipmentInlet", "Loop")?;
        reg.connect(n, by("Loop", NodeRole::LoopDemandInlet))?;
        reg.connect(n, by("Loop_SupplyPath", NodeRole::SupplyPathInlet))?;
        reg.connect(n, by("Loop_Splitter", NodeRole::ComponentInlet))?;
        reg.check_dangling(n)
    }

    #[test]
    fn test_component_cannot_feed_itself() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("N", "Loop")?;
        reg.connect(n, by("Coil", NodeRole::ComponentOutlet))?;
        assert!(reg.connect(n, by("Coil", NodeRole::ComponentInlet)).is_err());
        Ok(())
    }

    #[test]
    fn test_parent_and_child_share_outlet() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("Terminal_Outlet", "Loop")?;
        reg.connect(n, by("Terminal", NodeRole::ComponentOutlet))?;
        reg.connect(
            n,
            NodeUse {
                owner: "Reheat".to_string(),
                parent: Some("Terminal".to_string()),
                role: NodeRole::ComponentOutlet,
            },
        )?;
        assert_eq!(reg.node(n).producer().unwrap().owner, "Reheat");
        Ok(())
    }

    #[test]
    fn test_single_setpoint_writer() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = reg.allocate("N", "Loop")?;
        reg.connect(n, by("Reset", NodeRole::SetpointTarget))?;
        reg.connect(n, by("Coil", NodeRole::Sensor))?;
        assert!(reg.connect(n, by("Fixed24", NodeRole::SetpointTarget)).is_err());
        Ok(())
    }

    #[test]
    fn test_dangling_nodes() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let a = reg.allocate("A", "Loop")?;
        reg.connect(a, by("Coil", NodeRole::ComponentOutlet))?;
        assert!(matches!(reg.check_dangling(a), Err(ValidationError::DanglingNode { .. })));
        let b = reg.allocate("B", "Loop")?;
        assert!(reg.check_dangling(b).is_err());
        let c = reg.allocate("C", "Loop")?;
        reg.connect(c, by("Coil", NodeRole::ComponentOutlet))?;
        reg.connect(c, by("Loop", NodeRole::LoopSupplyOutlet))?;
        reg.check_dangling(c)
    }
}
