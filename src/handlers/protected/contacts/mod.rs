// Owner-scoped contact book endpoints under /api/contacts.

pub mod birthdays; // GET /api/contacts/upcoming-birthdays
pub mod collection; // GET + POST /api/contacts
pub mod record; // GET/PUT/PATCH/DELETE /api/contacts/:id
pub mod search; // GET /api/contacts/search
pub mod utils;

pub use birthdays::upcoming_birthdays_get;
pub use collection::{contacts_get, contacts_post};
pub use record::{contact_delete, contact_get, contact_update};
pub use search::search_get;
