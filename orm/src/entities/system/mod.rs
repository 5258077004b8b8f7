pub mod sys_user;

pub use sys_user::SysUser;
