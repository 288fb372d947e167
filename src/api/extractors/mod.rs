/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストの UserProfile を handler に提供する
 */
mod current_profile;

pub use current_profile::CurrentProfile;
