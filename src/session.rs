/// Session key holding the name of the logged-in user.
pub const USERNAME: &str = "username";
