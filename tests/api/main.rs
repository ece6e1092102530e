mod fake_users_api;
