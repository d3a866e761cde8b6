mod checkin_test;
mod dispatcher_test;
mod opener_test;
mod schedules_test;
