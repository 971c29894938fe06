use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::VisitError;
use crate::node::Node;

type Handler<S> = Rc<dyn Fn(&mut Visitor<S>, &Node) -> Result<(), VisitError>>;

/// Walks an abstract syntax tree with named callbacks, accumulating into a
/// caller-owned state value.
///
/// Handlers are keyed by node name, matched case-insensitively. The
/// dispatcher makes no traversal decisions of its own — each handler visits
/// whichever children it cares about, in whatever order, via
/// [`Node::accept`]. A node with no registered handler is a fatal error:
/// silently skipping it would silently drop part of the tree.
pub struct Visitor<S> {
    handlers: FxHashMap<String, Handler<S>>,
    pub state: S,
}

impl<S> Visitor<S> {
    pub fn new(state: S) -> Visitor<S> {
        Visitor {
            handlers: FxHashMap::default(),
            state,
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        handler: impl Fn(&mut Visitor<S>, &Node) -> Result<(), VisitError> + 'static,
    ) {
        self.handlers.insert(name.to_lowercase(), Rc::new(handler));
    }

    pub fn visit(&mut self, node: &Node) -> Result<(), VisitError> {
        let handler = self
            .handlers
            .get(&node.name.to_lowercase())
            .cloned()
            .ok_or_else(|| VisitError::Missing(node.name.clone()))?;
        handler(self, node)
    }
}

impl Node {
    pub fn accept<S>(&self, visitor: &mut Visitor<S>) -> Result<(), VisitError> {
        visitor.visit(self)
    }
}
