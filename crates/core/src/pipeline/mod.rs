pub mod attendance_kiosk;
