pub const DISCOVER_RECIPE_LIMIT: i64 = 50;

pub const DEFAULT_SERVINGS: i32 = 4;
pub const DEFAULT_FOOD_UNIT: &str = "GRAM";

pub const SESSION_LIFETIME_DAYS: i64 = 7;

pub const RECIPE_CATEGORIES: &[(&str, &str)] = &[
    ("APPETIZER", "Appetizer"),
    ("FIRSTCOURSE", "First course"),
    ("SECONDCOURSE", "Second course"),
    ("SIDES", "Sides"),
    ("YEASTPRODUCTS", "Yeast products"),
    ("DESSERT", "Dessert"),
    ("BEVERAGE", "Beverage"),
    ("OTHER", "Other"),
];

pub const DIFFICULTIES: &[(&str, &str)] = &[
    ("EASY", "Easy"),
    ("MEDIUM", "Medium"),
    ("HARD", "Hard"),
];

pub const TIME_UNITS: &[&str] = &["MINUTE", "HOUR"];

pub const WEEK_DAYS: &[&str] = &["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

pub const MEAL_SLOTS: &[&str] = &["BREAKFAST", "LUNCH", "DINNER", "SNACK"];
