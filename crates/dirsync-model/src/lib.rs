//! Entity model shared by every dirsync component.
//!
//! The model is built around a dual-identity pattern: each entity carries an
//! `ipid` (assigned by the upstream directory) and a `scimid` (assigned by the
//! downstream SCIM endpoint when the entity is created there). Content hashes
//! make reconciliation idempotent: two entities with equal content always
//! produce equal hashes, regardless of which side they were read from.

pub mod hash;

mod group;
mod member;
mod results;
mod state;
mod user;

pub use group::{Group, GroupBuilder};
pub use member::{GroupMembers, GroupMembersBuilder, Member, MemberBuilder};
pub use results::{GroupsMembersResult, GroupsResult, MembersResult, UsersResult};
pub use state::{State, StateResources, STATE_SCHEMA_VERSION};
pub use user::{
    Address, Email, EnterpriseData, Manager, Name, PhoneNumber, User, UserBuilder,
};
