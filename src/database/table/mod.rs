/// 報價觀測紀錄
pub mod quote_record;
