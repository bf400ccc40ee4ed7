pub mod utils;

pub use utils::{
    require_active, require_admin, require_course_member, require_course_staff,
    require_owner_or_admin, require_role,
};
