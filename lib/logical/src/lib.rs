pub mod algebra;
pub mod expr;

pub use algebra::{Algebra, AlgebraExtension, ExtensionNode, Executor, Filter, OrderCondition};
pub use expr::{Expression, ExpressionShape, ExpressionTransform, TransformError};
