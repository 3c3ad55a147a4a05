pub const SCHEMA: &str = r#"
-- Tours: the packages sold on the public site
CREATE TABLE IF NOT EXISTS tours (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL,
    duration TEXT NOT NULL,
    location TEXT NOT NULL,
    images TEXT NOT NULL DEFAULT '[]',     -- JSON array of URL strings, ordered
    locations TEXT NOT NULL DEFAULT '[]',  -- JSON array of {lat, lng, name}
    is_featured INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_tours_featured ON tours(is_featured);

-- Destinations: gallery entries with optional map coordinates
CREATE TABLE IF NOT EXISTS destinations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    image_url TEXT,                        -- legacy single cover, kept in sync with images[0]
    images TEXT NOT NULL DEFAULT '[]',
    latitude REAL,
    longitude REAL,
    locations TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Reviews: visitor submissions, hidden until approved
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    rating INTEGER NOT NULL,
    comment TEXT NOT NULL,
    facebook_url TEXT,
    instagram_url TEXT,
    tiktok_url TEXT,
    is_approved INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_reviews_approved ON reviews(is_approved);

-- Site profile: singleton holding contact info, hero images and SEO fields
CREATE TABLE IF NOT EXISTS site_profile (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    about_text TEXT,
    about_image TEXT,
    tours_hero_image TEXT,
    tours_hero_color TEXT,
    gallery_hero_image TEXT,
    gallery_hero_color TEXT,
    about_hero_image TEXT,
    about_hero_color TEXT,
    contact_hero_image TEXT,
    contact_hero_color TEXT,
    reviews_hero_image TEXT,
    reviews_hero_color TEXT,
    email TEXT,
    phone TEXT,
    address TEXT,
    facebook_url TEXT,
    instagram_url TEXT,
    tiktok_url TEXT,
    site_title TEXT,
    site_description TEXT,
    keywords TEXT,
    nav_color TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Home page: singleton holding the structured landing-page sections
CREATE TABLE IF NOT EXISTS home_page (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hero_title TEXT,
    hero_subtitle TEXT,
    hero_description TEXT,
    hero_image TEXT,
    why_choose_us_title TEXT,
    why_choose_us_features TEXT NOT NULL DEFAULT '[]',   -- JSON array of {icon, title, description}
    destinations_title TEXT,
    destinations_subtitle TEXT,
    popular_destinations TEXT NOT NULL DEFAULT '[]',     -- JSON array of {title, image, description}
    featured_tours_title TEXT,
    featured_tours_subtitle TEXT,
    testimonials_title TEXT,
    testimonials_subtitle TEXT,
    testimonials TEXT NOT NULL DEFAULT '[]',             -- JSON array of {name, avatar, comment, rating}
    newsletter_title TEXT,
    newsletter_description TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Contact form submissions
CREATE TABLE IF NOT EXISTS contact_submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    message TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'new',   -- 'new', 'read', 'archived'
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_contact_submissions_status ON contact_submissions(status);

-- Admin accounts
CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Admin sessions: opaque tokens issued at sign-in
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    admin_id INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (admin_id) REFERENCES admins(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);

-- Page visits for the dashboard counters
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page TEXT NOT NULL,
    user_agent TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_visits_created ON visits(created_at);
"#;

/// Idempotent migrations applied after the base schema. Each statement is
/// executed blindly; "duplicate column" errors from re-runs are ignored.
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE site_profile ADD COLUMN tiktok_url TEXT",
    "ALTER TABLE site_profile ADD COLUMN nav_color TEXT",
    "ALTER TABLE reviews ADD COLUMN tiktok_url TEXT",
    "ALTER TABLE contact_submissions ADD COLUMN status TEXT NOT NULL DEFAULT 'new'",
];
