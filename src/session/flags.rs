//! Login/logout transient flags.
//!
//! The authentication layer sets a pending marker when a user logs in or
//! out; the first gateway-handled request after that consumes the marker and
//! exposes `just_logged_in` / `just_logged_out` to components for exactly
//! one request.

use super::SessionData;

/// Consume the pending markers and set the transient flags accordingly.
/// Runs once per matched request, before any dispatch logic. The caller
/// holds the session write lock, so the read-clear transition is atomic
/// with respect to other requests on the same session.
pub fn update_flags(session: &mut SessionData) {
    if session.next_request_is_first_after_login {
        session.just_logged_in = true;
        session.next_request_is_first_after_login = false;
    } else {
        session.just_logged_in = false;
    }

    if session.next_request_is_first_after_logout {
        session.just_logged_out = true;
        session.next_request_is_first_after_logout = false;
    } else {
        session.just_logged_out = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_login_consumed() {
        let mut session = SessionData::default();
        session.next_request_is_first_after_login = true;

        update_flags(&mut session);
        assert!(session.just_logged_in);
        assert!(!session.next_request_is_first_after_login);

        update_flags(&mut session);
        assert!(!session.just_logged_in);
    }

    #[test]
    fn test_pending_logout_consumed() {
        let mut session = SessionData::default();
        session.next_request_is_first_after_logout = true;

        update_flags(&mut session);
        assert!(session.just_logged_out);
        assert!(!session.next_request_is_first_after_logout);

        update_flags(&mut session);
        assert!(!session.just_logged_out);
    }

    #[test]
    fn test_pairs_are_independent() {
        let mut session = SessionData::default();
        session.next_request_is_first_after_login = true;

        update_flags(&mut session);
        assert!(session.just_logged_in);
        assert!(!session.just_logged_out);
    }
}
