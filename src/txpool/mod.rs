//! Transaction Pool Multi-Index Store (Core B, §3–4): an Item Store with
//! four back-reference indices (Sender, Tip, Tip-Cap, Status), a
//! validator, a Job Queue, and the maintenance tasks that run off it.

pub mod indices;
pub mod item;
pub mod item_store;
pub mod job_queue;
pub mod pool;
pub mod tasks;
pub mod validator;
pub mod waste_basket;

pub use item::{Item, Status};
pub use job_queue::{JobKind, JobQueue, PoolJob};
pub use pool::{InsertOutcome, Pool};
pub use waste_basket::{RejectedItem, WasteBasket};
