/// One-shot messages carried across a redirect in the `notice` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notice {
    Welcome,
    LoggedIn,
    LoggedOut,
    LoginRequired,
    Forbidden,
    AccountDeleted,
    FeedbackAdded,
    FeedbackUpdated,
    FeedbackDeleted,
}

impl Notice {
    const ALL: [Notice; 9] = [
        Notice::Welcome,
        Notice::LoggedIn,
        Notice::LoggedOut,
        Notice::LoginRequired,
        Notice::Forbidden,
        Notice::AccountDeleted,
        Notice::FeedbackAdded,
        Notice::FeedbackUpdated,
        Notice::FeedbackDeleted,
    ];

    pub(crate) fn code(self) -> &'static str {
        match self {
            Notice::Welcome => "welcome",
            Notice::LoggedIn => "logged-in",
            Notice::LoggedOut => "logged-out",
            Notice::LoginRequired => "login-required",
            Notice::Forbidden => "forbidden",
            Notice::AccountDeleted => "account-deleted",
            Notice::FeedbackAdded => "feedback-added",
            Notice::FeedbackUpdated => "feedback-updated",
            Notice::FeedbackDeleted => "feedback-deleted",
        }
    }

    /// Unknown codes are ignored rather than echoed back into the page.
    pub(crate) fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    pub(crate) fn message(self) -> &'static str {
        match self {
            Notice::Welcome => "Welcome to the Feedback board! Your account is ready.",
            Notice::LoggedIn => "Welcome back!",
            Notice::LoggedOut => "You have been logged out.",
            Notice::LoginRequired => "Please log in first.",
            Notice::Forbidden => "You don't have permission to do that.",
            Notice::AccountDeleted => "Your account and all of its feedback were deleted.",
            Notice::FeedbackAdded => "Feedback added.",
            Notice::FeedbackUpdated => "Feedback updated.",
            Notice::FeedbackDeleted => "Feedback deleted.",
        }
    }

    pub(crate) fn is_error(self) -> bool {
        matches!(self, Notice::LoginRequired | Notice::Forbidden)
    }
}
