use chrono::NaiveDate;
use polars::prelude::*;
use portfolio::normalize::normalize;
use portfolio::{source, Options, Report};
use report::TableKind;

const BOOK: &str = "\
ID,Portfolio #,Date_of_birth,Gender,city,county,duedate,original_sum,principal,interest,current balance,total_paid,fee 1,fee 2,fee 3,fee 4
1,1,12/04/1979,Male,Riga,Riga,15/01/2023,1200,1000,200,700,500,10,5,,
2,1,03/11/1988,Female,Jelgava,Zemgale,02/02/2023,800,700,100,800,0,10,,,
3,1,,Male,Riga,Riga,28/02/2023,1500,1300,200,300,1200,,,,
4,2,21/07/1992,Female,Liepaja,Kurzeme,10/01/2023,2400,2000,400,1400,1000,20,10,5,
5,2,09/09/1975,Male,Ventspils,Kurzeme,19/01/2023,1800,1500,300,0,1800,15,,,
";

fn main() {
    let raw = source::read_records(BOOK.as_bytes()).unwrap();
    let dataset = normalize(&raw, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    let analysis = Report::build(&dataset, &Options::default()).unwrap();

    for kind in [TableKind::Balance, TableKind::Kpi] {
        let table = kind.render(&analysis);
        let df: DataFrame = report::to_dataframe(&table).unwrap();
        println!("{}", table.title);
        println!("{}", df)
    }
}
