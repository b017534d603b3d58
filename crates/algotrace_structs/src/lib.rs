//! AlgoTrace Instrumented Containers
//!
//! Ordinary containers that append a record to a shared [`StateLog`]
//! on every observable operation. Each container is declared exactly
//! once, and every later record carries a value copy of the container's
//! state at that moment.
//!
//! [`StateLog`]: algotrace_log::StateLog

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod contract;
pub mod doubly_linked_list;
pub mod linked_list;
pub mod map;
pub mod priority_queue;
pub mod queue;
pub mod set;
pub mod stack;
pub mod text;
pub mod variable;
pub mod vector;

pub use array::{Array, ArrayIndex};
pub use contract::{Binding, Instrumented, NONE};
pub use doubly_linked_list::{DoublyLinkedList, DoublyLinkedListNode, List};
pub use linked_list::{ForwardList, LinkedList, LinkedListNode};
pub use map::Map;
pub use priority_queue::PriorityQueue;
pub use queue::Queue;
pub use set::Set;
pub use stack::Stack;
pub use text::Text;
pub use variable::Variable;
pub use vector::Vector;
