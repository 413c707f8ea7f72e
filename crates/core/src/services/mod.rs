//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod authority;
pub mod comment;
pub mod event;
pub mod fanout;
pub mod jobs;
pub mod like;
pub mod notice;
pub mod notification;
pub mod organization;
pub mod push;
pub mod team;
pub mod testimony;
pub mod user;

pub use auth::{AuthService, Claims, TokenPair, hash_password, verify_password};
pub use authority::{
    AuthorityProfile, AuthorityService, DEFAULT_AUTHORITY_NAME, MANAGE_TRAINING_LEVEL,
    MANAGE_USERS_LEVEL, NO_AUTHORITY_LEVEL, ResolvedAuthority, ResolvedAuthoritySet,
};
pub use comment::{CommentService, CommentView, CreateCommentInput};
pub use event::{CreateEventInput, EventService, UpdateEventInput};
pub use fanout::{
    ContentEvent, FanoutService, FanoutStatus, NOTIFICATION_MESSAGE_MAX_CHARS,
    PROVIDER_UNAVAILABLE_WARNING, PUSH_BODY_MAX_CHARS, truncate_chars,
};
pub use jobs::{Job, JobSender, JobService, JobWorkerContext};
pub use like::{LikeService, LikeSummary};
pub use notice::{CreateNoticeInput, NoticeService, UpdateNoticeInput};
pub use notification::{NotificationPage, NotificationService};
pub use organization::{BranchTree, GroupNode, OrganizationService, RegionTree};
pub use push::{PushGateway, PushMessage, PushTarget, SendOutcome, is_valid_push_token};
pub use team::{CreateTeamInput, TeamMemberView, TeamService, TeamView};
pub use testimony::{CreateTestimonyInput, TestimonyService, UpdateTestimonyInput};
pub use user::{CreateUserInput, PlacementInput, UpdateUserInput, UserService};
