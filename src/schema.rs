// Diesel schema definitions, kept in sync with src/migrations.

diesel::table! {
    media_file (media_file_id) {
        media_file_id -> Text,
        media_type_id -> Text,
        media_file_blocked -> Bool,
        media_file_checked -> Bool,
    }
}

diesel::table! {
    record (record_id) {
        record_id -> Integer,
        member_id -> Text,
        record_content -> Text,
        record_created_at -> Timestamp,
    }
}

diesel::table! {
    record_keyword (record_keyword_id) {
        record_keyword_id -> Integer,
        record_id -> Integer,
        #[sql_name = "record_keyword"]
        keyword -> Text,
    }
}

diesel::table! {
    diary (diary_id) {
        diary_id -> Integer,
        member_id -> Text,
        diary_year -> Integer,
        diary_month -> Integer,
    }
}

diesel::table! {
    diary_keyword (diary_keyword_id) {
        diary_keyword_id -> Integer,
        diary_id -> Integer,
        #[sql_name = "diary_keyword"]
        keyword -> Text,
        diary_freq -> Integer,
    }
}

diesel::joinable!(record_keyword -> record (record_id));
diesel::joinable!(diary_keyword -> diary (diary_id));

diesel::allow_tables_to_appear_in_same_query!(
    media_file,
    record,
    record_keyword,
    diary,
    diary_keyword,
);
