//! Effect trees
//!
//! Model code never touches the view directly. Every state transition
//! returns an [`Effect`]: either nothing, a single [`Leaf`] naming one
//! handler (`model.board.roll`, `view.shop.showOffer`, ...), or a [`Phase`]
//! grouping children that run one after another or side by side.
//!
//! Building a tree has no side effects. Empty children are left in place
//! and pruned by the controller when it resolves the tree.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::DispatchError;
use crate::symbol::{Cost, SymbolRef};

/// Which side of the controller handles a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Model,
    View,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Model => "model",
            Kind::View => "view",
        }
    }
}

/// Execution strategy of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Children run strictly one after another
    Serial,
    /// Children run concurrently and are all awaited
    Parallel,
}

/// A single parameter value carried by a leaf
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Symbol(SymbolRef),
    Amounts(Cost),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Amounts(_) => "amounts",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Symbol(s) => write!(f, "{}", s.emoji()),
            Value::Amounts(cost) => {
                let parts: Vec<String> = cost.iter().map(|(k, v)| format!("{v}{k}")).collect();
                write!(f, "{}", parts.join("+"))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<SymbolRef> for Value {
    fn from(v: SymbolRef) -> Self {
        Value::Symbol(v)
    }
}

impl From<&SymbolRef> for Value {
    fn from(v: &SymbolRef) -> Self {
        Value::Symbol(v.clone())
    }
}

impl From<Cost> for Value {
    fn from(v: Cost) -> Self {
        Value::Amounts(v)
    }
}

/// Named parameters of a leaf, with typed accessors for handlers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn require(&self, key: &str) -> Result<&Value, DispatchError> {
        self.0.get(key).ok_or_else(|| DispatchError::MissingParam {
            key: key.to_string(),
        })
    }

    fn mismatch(key: &str, expected: &'static str, found: &Value) -> DispatchError {
        DispatchError::ParamType {
            key: key.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, DispatchError> {
        match self.require(key)? {
            Value::Int(v) => Ok(*v),
            other => Err(Self::mismatch(key, "int", other)),
        }
    }

    /// Integer parameter that falls back to `default` when absent
    pub fn int_or(&self, key: &str, default: i64) -> Result<i64, DispatchError> {
        if self.contains(key) {
            self.int(key)
        } else {
            Ok(default)
        }
    }

    pub fn float(&self, key: &str) -> Result<f64, DispatchError> {
        match self.require(key)? {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(Self::mismatch(key, "float", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, DispatchError> {
        match self.require(key)? {
            Value::Bool(v) => Ok(*v),
            other => Err(Self::mismatch(key, "bool", other)),
        }
    }

    pub fn str(&self, key: &str) -> Result<&str, DispatchError> {
        match self.require(key)? {
            Value::Str(v) => Ok(v),
            other => Err(Self::mismatch(key, "string", other)),
        }
    }

    pub fn symbol(&self, key: &str) -> Result<&SymbolRef, DispatchError> {
        match self.require(key)? {
            Value::Symbol(v) => Ok(v),
            other => Err(Self::mismatch(key, "symbol", other)),
        }
    }

    pub fn amounts(&self, key: &str) -> Result<&Cost, DispatchError> {
        match self.require(key)? {
            Value::Amounts(v) => Ok(v),
            other => Err(Self::mismatch(key, "amounts", other)),
        }
    }

    /// The `x`/`y` pair most board actions address
    pub fn coords(&self) -> Result<(i32, i32), DispatchError> {
        let x = self.int("x")?;
        let y = self.int("y")?;
        let narrow = |key: &str, v: i64| {
            i32::try_from(v).map_err(|_| DispatchError::ParamType {
                key: key.to_string(),
                expected: "coordinate",
                found: "int",
            })
        };
        Ok((narrow("x", x)?, narrow("y", y)?))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// A named action for exactly one handler
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub kind: Kind,
    pub domain: String,
    pub action: String,
    pub params: Params,
}

impl Leaf {
    /// Build a leaf from a `domain.action` path
    pub fn new(kind: Kind, path: &str) -> Self {
        let (domain, action) = path.split_once('.').unwrap_or((path, ""));
        Self {
            kind,
            domain: domain.to_string(),
            action: action.to_string(),
            params: Params::new(),
        }
    }

    /// Parse a full `<kind>.<domain>.<action>` path
    pub fn parse(path: &str) -> Option<Self> {
        let (kind, rest) = path.split_once('.')?;
        let kind = match kind {
            "model" => Kind::Model,
            "view" => Kind::View,
            _ => return None,
        };
        if !rest.contains('.') {
            return None;
        }
        Some(Self::new(kind, rest))
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Merge a whole parameter map into this leaf
    pub fn params(mut self, params: Params) -> Self {
        self.params.0.extend(params.0);
        self
    }

    /// Shorthand for the `x`/`y` pair
    pub fn at(self, x: i32, y: i32) -> Self {
        self.param("x", x).param("y", y)
    }

    pub fn path(&self) -> String {
        format!("{}.{}.{}", self.kind.as_str(), self.domain, self.action)
    }

    pub fn is_model(&self) -> bool {
        self.kind == Kind::Model
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path(), self.params)
    }
}

/// An ordered group of effects
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub strategy: Strategy,
    pub effects: Vec<Effect>,
}

/// A node of an effect tree
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Effect {
    /// No effect
    #[default]
    None,
    Leaf(Leaf),
    Phase(Phase),
}

impl Effect {
    pub fn none() -> Self {
        Effect::None
    }

    pub fn serial(effects: Vec<Effect>) -> Self {
        Effect::Phase(Phase {
            strategy: Strategy::Serial,
            effects,
        })
    }

    pub fn parallel(effects: Vec<Effect>) -> Self {
        Effect::Phase(Phase {
            strategy: Strategy::Parallel,
            effects,
        })
    }

    /// Leaf for a model handler, e.g. `Effect::model("board.roll")`
    pub fn model(path: &str) -> Leaf {
        Leaf::new(Kind::Model, path)
    }

    /// Leaf for a view handler, e.g. `Effect::view("board.spin")`
    pub fn view(path: &str) -> Leaf {
        Leaf::new(Kind::View, path)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }

    /// Rebuild a phase from resolved children, dropping empty ones.
    /// Zero children collapse to `None`, a single child stands for itself.
    pub fn collapse(strategy: Strategy, children: Vec<Effect>) -> Self {
        let mut children: Vec<Effect> = children.into_iter().filter(|e| !e.is_none()).collect();
        match children.len() {
            0 => Effect::None,
            1 => children.pop().unwrap_or_default(),
            _ => Effect::Phase(Phase {
                strategy,
                effects: children,
            }),
        }
    }

    /// All leaves in depth-first order
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Effect::None => {}
                Effect::Leaf(leaf) => out.push(leaf),
                Effect::Phase(phase) => stack.extend(phase.effects.iter().rev()),
            }
        }
        out
    }

    /// Whether any leaf has the given full path
    pub fn contains(&self, path: &str) -> bool {
        self.leaves().iter().any(|leaf| leaf.path() == path)
    }

    /// Whether any leaf still targets the model
    pub fn has_model_leaves(&self) -> bool {
        self.leaves().iter().any(|leaf| leaf.is_model())
    }
}

impl From<Leaf> for Effect {
    fn from(leaf: Leaf) -> Self {
        Effect::Leaf(leaf)
    }
}

impl From<Phase> for Effect {
    fn from(phase: Phase) -> Self {
        Effect::Phase(phase)
    }
}

impl From<Option<Effect>> for Effect {
    fn from(effect: Option<Effect>) -> Self {
        effect.unwrap_or_default()
    }
}

/// Serial phase from a list of anything convertible into an [`Effect`]
#[macro_export]
macro_rules! serial {
    ($($e:expr),* $(,)?) => {
        $crate::effect::Effect::serial(vec![$($crate::effect::Effect::from($e)),*])
    };
}

/// Parallel phase from a list of anything convertible into an [`Effect`]
#[macro_export]
macro_rules! parallel {
    ($($e:expr),* $(,)?) => {
        $crate::effect::Effect::parallel(vec![$($crate::effect::Effect::from($e)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_path_roundtrip() {
        let leaf = Effect::model("board.addSymbol").at(1, 2);
        assert_eq!(leaf.path(), "model.board.addSymbol");
        assert_eq!(leaf.params.coords().unwrap(), (1, 2));

        let parsed = Leaf::parse("view.shop.showOffer").unwrap();
        assert_eq!(parsed.kind, Kind::View);
        assert_eq!(parsed.domain, "shop");
        assert_eq!(parsed.action, "showOffer");
        assert!(Leaf::parse("board.roll").is_none());
        assert!(Leaf::parse("ui.board.roll").is_none());
    }

    #[test]
    fn test_builder_keeps_empty_children() {
        let tree = serial![Effect::none(), Effect::view("board.spin"), Effect::none()];
        match &tree {
            Effect::Phase(phase) => assert_eq!(phase.effects.len(), 3),
            _ => panic!("expected phase"),
        }
    }

    #[test]
    fn test_collapse_prunes() {
        assert!(Effect::collapse(Strategy::Serial, vec![Effect::none()]).is_none());

        let single = Effect::collapse(
            Strategy::Parallel,
            vec![Effect::none(), Effect::view("board.spin").into()],
        );
        assert!(matches!(single, Effect::Leaf(_)));

        let pair = Effect::collapse(
            Strategy::Parallel,
            vec![Effect::view("a.b").into(), Effect::view("c.d").into()],
        );
        match pair {
            Effect::Phase(phase) => {
                assert_eq!(phase.strategy, Strategy::Parallel);
                assert_eq!(phase.effects.len(), 2);
            }
            _ => panic!("expected phase"),
        }
    }

    #[test]
    fn test_leaves_depth_first() {
        let tree = serial![
            Effect::view("a.one"),
            parallel![Effect::view("b.two"), serial![Effect::model("c.three")]],
            Effect::view("d.four"),
        ];
        let paths: Vec<String> = tree.leaves().iter().map(|l| l.path()).collect();
        assert_eq!(
            paths,
            vec!["view.a.one", "view.b.two", "model.c.three", "view.d.four"]
        );
        assert!(tree.has_model_leaves());
        assert!(tree.contains("view.d.four"));
    }

    #[test]
    fn test_param_type_errors() {
        let leaf = Effect::view("inventory.resourceSet")
            .param("key", "💵")
            .param("value", 3);
        assert_eq!(leaf.params.int("value").unwrap(), 3);
        assert_eq!(leaf.params.str("key").unwrap(), "💵");
        assert!(matches!(
            leaf.params.int("key"),
            Err(DispatchError::ParamType { .. })
        ));
        assert!(matches!(
            leaf.params.int("missing"),
            Err(DispatchError::MissingParam { .. })
        ));
        assert_eq!(leaf.params.int_or("missing", 7).unwrap(), 7);
    }
}
