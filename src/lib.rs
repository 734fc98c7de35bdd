//! A small set of generic containers: an ordered map on a treap with its nodes
//! threaded in key order, a chained hash map, and the arena-backed doubly
//! linked list the ordered map uses as scratch space.
//!
//! ```
//! use treap_collections::TreeMap;
//!
//! let mut map = TreeMap::new();
//! for (k, v) in [(5, 50), (3, 30), (8, 80)].iter() {
//!     map.put(*k, *v).unwrap();
//! }
//!
//! map.remove(&3).unwrap();
//! assert!(map.get(&3).is_err());
//! assert_eq!(
//!     vec![(&5, &50), (&8, &80)],
//!     map.iter().collect::<Vec<_>>()
//! );
//! ```

mod error;
mod hash_map;
pub mod linked_list;
mod map;
mod stack;
mod tree_map;

#[cfg(feature = "shared_map")]
mod shared_map;

pub use error::{Error, Result};
pub use hash_map::HashMap;
pub use linked_list::{LinkedList, NodeHandle};
pub use map::Map;
pub use stack::Stack;
pub use tree_map::{Cursor, Entry, Iter, TreeMap};

#[cfg(feature = "shared_map")]
pub use shared_map::SharedMap;
